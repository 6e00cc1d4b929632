pub mod types;
pub mod logger;
pub mod settings;
pub mod encoding;
pub mod text_helpers;
pub mod tracker;
pub mod xml_reader;
pub mod output;

pub use types::{ConvertError, ParsedDocument, Task};
pub use xml_reader::{convert_file, convert_str};
pub use output::{dispatch, DocumentTitle, OutputTarget, TitleLookup, TitleTable};
