pub mod oauth;
pub mod twitter;

pub use oauth::{OAuth1Credentials, TwitterAuth};
pub use twitter::TwitterClient;
