pub mod document;
pub mod fetch;

pub use document::SvgDocument;
pub use fetch::FileFetcher;
