pub mod database;
pub mod forwarder;
pub mod providers;

pub use database::{
    DataAccessError, MockSensorRepository, MySqlSensorRepository, SensorReader, SensorRepository,
};
pub use forwarder::CodeForwarder;
pub use providers::{
    ChatMessage, MessagingProvider, MockMessagingProvider, ProviderError, ProviderResponse,
    TwilioProvider,
};
