pub mod news_download_job;

pub use news_download_job::NewsDownloadJob;
