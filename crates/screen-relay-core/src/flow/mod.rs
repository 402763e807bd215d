mod manager;
mod view;

pub use {
    manager::{CaptureUploadFlow, UploadResult},
    view::{FlowStatus, ViewState},
};
