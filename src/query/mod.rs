//! Advanced search string parsing, highlighting and translation
//!
//! A search string mixes free text with `keyword:value` terms. The parser
//! never fails: anything it cannot read as a term is kept as free text.
//!
//! # Syntax
//!
//! ```text
//! keyword:value          Include records matching this term
//! -keyword:value         Exclude records matching this term
//! keyword:"two words"    Exact phrase (quoted)
//! anything else          Free text; consecutive words form one freetext offset
//! +                      Trailing picker marker, ignored
//! ```
//!
//! # Keywords
//!
//! - Relation keywords: `assignee`, `status`, `stage`, `tag`, `opportunity`,
//!   `contact`, `company`, `active`
//! - Field aliases from [`SearchFields`] (custom and native fields)
//! - Anything else parses but is not highlighted and is skipped (or
//!   rejected in strict mode) by [`translate`]
//!
//! # Examples
//!
//! ```text
//! status:open                          Open records
//! -company:Acme renewal                Mentions "renewal", not linked to Acme
//! tag:"big deal" active:true           Active records tagged "big deal"
//! city:Paris -stage:lost               Field match plus excluded stage
//! ```

pub mod error;
pub mod fields;
pub mod highlight;
pub mod parser;
pub mod serializer;
pub mod session;
pub mod translate;

pub use error::SearchError;
pub use fields::{FieldMatching, FieldMeta, KeywordKind, RELATION_KEYWORDS, SearchFields};
pub use highlight::{Segment, TagClass, highlight, render_ansi, render_html};
pub use parser::{Offset, ParsedQuery, parse};
pub use serializer::serialize;
pub use session::{SavedView, SavedViews, SearchSession, SubmitAction};
pub use translate::{
    IgnoredOffset, MatchOp, Predicate, TranslateOptions, Translation, translate,
};

/// Print warnings for keywords that will not take part in the search
///
/// This helps users spot typos in field aliases.
pub fn print_search_warnings(parsed: &ParsedQuery, fields: &SearchFields) {
    for offset in &parsed.offsets {
        if fields.classify(&offset.keyword) == KeywordKind::Unknown {
            eprintln!(
                "Warning: Unknown search keyword '{}'. Known keywords are: {:?}",
                offset.keyword,
                fields.picker_keywords()
            );
        }
    }
}
