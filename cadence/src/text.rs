use derive_more::Display;

/// The snippet bound to a typing session.
///
/// A `TargetText` is immutable once created: the same value is used for every
/// classification and completion check during a session. Content is stored as
/// Unicode code points so indexing matches what the user sees, and any
/// `"\r\n"` pairs are normalised to `"\n"` at construction — targets never
/// carry carriage returns.
///
/// # Examples
///
/// ```rust
/// use cadence::TargetText;
///
/// let target = TargetText::new("def f():\n    pass").unwrap();
/// assert_eq!(target.text_len(), 17);
/// assert_eq!(target.char_at(8), Some('\n'));
///
/// // Empty snippets are rejected
/// assert!(TargetText::new("").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{content}")]
pub struct TargetText {
    content: String,
    characters: Vec<char>,
}

impl TargetText {
    /// Create a target from snippet content.
    ///
    /// Returns `None` if the content is empty.
    pub fn new(content: &str) -> Option<Self> {
        if content.is_empty() {
            return None;
        }

        let content = content.replace("\r\n", "\n");
        let characters = content.chars().collect();

        Some(Self {
            content,
            characters,
        })
    }

    /// The snippet content, newline-normalised.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The amount of characters in the target.
    pub fn text_len(&self) -> usize {
        self.characters.len()
    }

    /// Get the character at `index`, if any.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.characters.get(index).copied()
    }

    /// All characters of the target.
    pub fn chars(&self) -> &[char] {
        &self.characters
    }

    /// Whether `index` sits inside a leading indentation run.
    ///
    /// A leading indentation run is a sequence of spaces or tabs immediately
    /// after a newline, or at the very start of the text. This predicate is
    /// deliberately independent of any match classification: it only looks at
    /// the target.
    ///
    /// ```rust
    /// use cadence::TargetText;
    ///
    /// let target = TargetText::new("if x:\n    y = 1").unwrap();
    /// assert!(target.is_leading_indent(6)); // first space of the run
    /// assert!(target.is_leading_indent(9)); // last space of the run
    /// assert!(!target.is_leading_indent(10)); // 'y'
    /// assert!(!target.is_leading_indent(4)); // ':' is not whitespace
    /// ```
    pub fn is_leading_indent(&self, index: usize) -> bool {
        let Some(char) = self.char_at(index) else {
            return false;
        };

        if char != ' ' && char != '\t' {
            return false;
        }

        // Every character back to the start of the line must also be
        // indentation whitespace.
        self.characters[..index]
            .iter()
            .rev()
            .take_while(|&&prev| prev != '\n')
            .all(|&prev| prev == ' ' || prev == '\t')
    }

    /// The indentation run directly following the newline at `newline_index`.
    ///
    /// Returns an empty slice when the character at `newline_index` is not a
    /// newline, or when the following line starts without indentation.
    pub fn indent_run_after(&self, newline_index: usize) -> &[char] {
        if self.char_at(newline_index) != Some('\n') {
            return &[];
        }

        let start = newline_index + 1;
        let end = self.characters[start..]
            .iter()
            .take_while(|&&char| char == ' ' || char == '\t')
            .count();

        &self.characters[start..start + end]
    }
}
