mod blob;
mod codec;
mod encoder;
pub(crate) mod ffmpeg;
mod recorder;

pub use {
    blob::{ChunkAccumulator, VideoBlob, read_as_data_url},
    codec::{BLOB_MIME_TYPE, FALLBACK_MIME_TYPE, PREFERRED_MIME_TYPE, select_mime_type},
    encoder::{EncoderEvent, EncodingSession, EventSender, VideoEncoder},
    ffmpeg::FfmpegEncoder,
    recorder::{MediaRecorder, RecorderState},
};

#[cfg(test)]
pub(crate) use blob::encode_data_url;
