//! Splitting streamed text into capacity-bounded pages.

/// Page decoration and size limit of the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Maximum length of one rendered message, in characters.
    pub max_size: usize,
    /// Line placed before page content (e.g. an opening code fence).
    pub prefix: String,
    /// Line placed after page content.
    pub suffix: String,
}

impl PageLayout {
    /// Separator between lines of a page.
    pub const LINESEP: char = '\n';

    /// Create a layout with the given limit and decoration.
    pub fn new(max_size: usize, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            max_size,
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn prefix_len(&self) -> usize {
        self.prefix.chars().count()
    }

    fn suffix_len(&self) -> usize {
        self.suffix.chars().count()
    }

    /// Usable content characters per page.
    ///
    /// The line separator is counted twice: once after the prefix and
    /// once before the suffix. Returns 0 if decoration alone fills a page.
    pub fn capacity(&self) -> usize {
        self.max_size
            .saturating_sub(self.prefix_len())
            .saturating_sub(self.suffix_len())
            .saturating_sub(2)
    }

    /// Wrap page content in the prefix and suffix lines.
    pub fn decorate(&self, content: &str) -> String {
        let mut out = String::with_capacity(
            self.prefix.len() + content.len() + self.suffix.len() + 2,
        );
        out.push_str(&self.prefix);
        out.push(Self::LINESEP);
        out.push_str(content);
        out.push(Self::LINESEP);
        out.push_str(&self.suffix);
        out
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new(2000, "```ansi", "```")
    }
}

/// Append-only sequence of pages.
///
/// Every page holds at most [`PageLayout::capacity`] characters of
/// content once its lines are joined with `\n`.
#[derive(Debug, Clone)]
pub struct Paginator {
    layout: PageLayout,
    capacity: usize,
    pages: Vec<String>,
    current: String,
    /// Characters used on the current page, decoration included.
    count: usize,
    current_has_lines: bool,
}

impl Paginator {
    /// Create an empty paginator.
    pub fn new(layout: PageLayout) -> Self {
        let capacity = layout.capacity().max(1);
        let count = layout.prefix_len() + 1;
        Self {
            layout,
            capacity,
            pages: Vec::new(),
            current: String::new(),
            count,
            current_has_lines: false,
        }
    }

    /// The layout this paginator fills pages for.
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Content characters available per page.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a fragment of arbitrary length.
    ///
    /// Spans that reach capacity are split at the last newline, else the
    /// last space, else hard at exactly `capacity` characters. A newline
    /// used as a split point is consumed; a space is kept at the start of
    /// the next line. An empty trailing span adds nothing.
    pub fn add_fragment(&mut self, fragment: &str) {
        let chars: Vec<char> = fragment.chars().collect();
        let mut start = 0;
        let mut needle = 0;
        let mut last_newline: Option<usize> = None;
        let mut last_space: Option<usize> = None;

        while needle < chars.len() {
            if needle - start >= self.capacity {
                match (last_newline, last_space) {
                    (Some(nl), _) => {
                        self.push_line(&chars[start..nl]);
                        needle = nl + 1;
                        start = nl + 1;
                    }
                    (None, Some(sp)) if sp > start => {
                        self.push_line(&chars[start..sp]);
                        needle = sp + 1;
                        start = sp;
                    }
                    _ => {
                        self.push_line(&chars[start..needle]);
                        start = needle;
                    }
                }
                last_newline = None;
                last_space = None;
                continue;
            }

            match chars[needle] {
                '\n' => last_newline = Some(needle),
                ' ' => last_space = Some(needle),
                _ => {}
            }
            needle += 1;
        }

        if start < chars.len() {
            self.push_line(&chars[start..]);
        }
    }

    fn push_line(&mut self, line: &[char]) {
        let len = line.len();
        let limit = self.layout.max_size.saturating_sub(self.layout.suffix_len());
        if self.current_has_lines && self.count + len + 1 > limit {
            self.close_page();
        }

        if self.current_has_lines {
            self.current.push(PageLayout::LINESEP);
        }
        self.current.extend(line);
        self.count += len + 1;
        self.current_has_lines = true;
    }

    fn close_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.count = self.layout.prefix_len() + 1;
        self.current_has_lines = false;
    }

    /// Number of pages, counting the in-progress one.
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(self.current_has_lines)
    }

    /// Whether no text has been added yet.
    pub fn is_empty(&self) -> bool {
        self.page_count() == 0
    }

    /// Index of the latest page, or `None` when empty.
    pub fn last_index(&self) -> Option<usize> {
        self.page_count().checked_sub(1)
    }

    /// Content of a page without decoration.
    pub fn page(&self, index: usize) -> Option<&str> {
        if index < self.pages.len() {
            Some(&self.pages[index])
        } else if index == self.pages.len() && self.current_has_lines {
            Some(&self.current)
        } else {
            None
        }
    }

    /// Content of a page wrapped in the layout decoration.
    pub fn rendered_page(&self, index: usize) -> Option<String> {
        self.page(index).map(|content| self.layout.decorate(content))
    }

    /// All pages in order, the in-progress one last.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        let current = self.current_has_lines.then_some(self.current.as_str());
        self.pages.iter().map(String::as_str).chain(current)
    }
}
