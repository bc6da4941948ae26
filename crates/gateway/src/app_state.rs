use reqwest::Client;
use url::Url;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: Client,
    pub(crate) predict_url: Url,
}
