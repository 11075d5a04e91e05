use crate::models::Note;
use crate::parser::reference_marker;

pub const WELCOME_TITLE: &str = "Welcome to noteweave";
pub const CHEAT_SHEET_TITLE: &str = "Markdown Cheat Sheet";

const CHEAT_SHEET_BODY: &str = r#"# Markdown Cheat Sheet

## Headings
# Heading 1
## Heading 2
### Heading 3

## Formatting
**Bold text**
*Italic text*
~~Strikethrough~~

## Lists
- Unordered item
  - Nested item

1. Ordered item
2. Second item

## Links
[Link text](https://example.com)
[[Shown text|note-id]] links to another note by id

## Blockquotes
> Quoted text

## Code
Inline `code` with backticks

```rust
fn main() {
    println!("hello");
}
```

## Tables
| Header 1 | Header 2 |
| -------- | -------- |
| Cell 1   | Cell 2   |

## Task Lists
- [x] Done
- [ ] Not yet
"#;

/// Notes inserted into an empty store on first start.
///
/// The welcome note is listed last so it sorts first when listing newest
/// first, and it points at the cheat sheet through a reference marker.
pub fn welcome_notes() -> Vec<Note> {
    let cheat_sheet = Note::new(
        CHEAT_SHEET_TITLE,
        CHEAT_SHEET_BODY,
        vec!["markdown".to_string(), "reference".to_string()],
    );

    let welcome_body = format!(
        "# Welcome to noteweave!\n\n\
         Your notes live here, linked together as you write.\n\n\
         ## Features\n\n\
         - **Markdown**: write in markdown with a live preview\n\
         - **References**: link notes with `[[display text|note-id]]`, \
         like this one to the {marker}\n\
         - **Tags**: notes sharing a tag are connected in the graph\n\
         - **Search**: find notes by title or content\n\
         - **AI helpers**: summaries, tag ideas and grammar fixes when a Gemini key is set\n\n\
         Happy note-taking!",
        marker = reference_marker(CHEAT_SHEET_TITLE, &cheat_sheet.id),
    );
    let welcome = Note::new(
        WELCOME_TITLE,
        welcome_body,
        vec!["welcome".to_string(), "getting-started".to_string()],
    );

    vec![cheat_sheet, welcome]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, extract_links};

    #[test]
    fn welcome_note_references_cheat_sheet() {
        let notes = welcome_notes();
        let links = extract_links(&notes);
        assert_eq!(links, vec![Link::reference(&notes[1].id, &notes[0].id)]);
        assert_eq!(notes[1].title, WELCOME_TITLE);
    }
}
