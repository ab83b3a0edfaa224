pub mod fetcher;
pub mod gemini_llm;
pub mod pdf;

pub use fetcher::HttpDocumentFetcher;
pub use gemini_llm::GeminiModelAdapter;
pub use pdf::PdfTextExtractor;
