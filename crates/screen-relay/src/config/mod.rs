mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod server_config;
mod upload_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    server_config::ServerConfig, upload_config::UploadConfig,
};

pub(crate) const DEFAULT_OPEN_BROWSER: bool = true;
pub(crate) const DEFAULT_PORT: u16 = 7878;
pub(crate) const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:3000";

pub(crate) fn default_open_browser() -> bool {
    DEFAULT_OPEN_BROWSER
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_ffmpeg_path() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_FFMPEG_PATH)
}

pub(crate) fn default_framerate() -> u32 {
    screen_relay_core::DEFAULT_FRAMERATE
}

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_endpoint() -> String {
    screen_relay_core::DEFAULT_UPLOAD_ENDPOINT.to_string()
}
