//! Preedit string and its display attributes.

/// Underline style of a text attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underline {
    None,
    Single,
    Double,
    Low,
    Error,
}

/// Style applied to a byte range of the preedit text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    Underline(Underline),
}

/// Attribute over `start_index..end_index`, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub attr_type: AttrType,
    pub start_index: usize,
    pub end_index: usize,
}

impl Attribute {
    pub fn underline(style: Underline, start_index: usize, end_index: usize) -> Self {
        Self {
            attr_type: AttrType::Underline(style),
            start_index,
            end_index,
        }
    }

    fn attr_type_kind(&self) -> std::mem::Discriminant<AttrType> {
        std::mem::discriminant(&self.attr_type)
    }
}

/// Ordered attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrList {
    attrs: Vec<Attribute>,
}

impl AttrList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `attr`, replacing any attribute of the same type on the
    /// same range.
    pub fn change(&mut self, attr: Attribute) {
        self.attrs.retain(|a| {
            !(a.attr_type_kind() == attr.attr_type_kind()
                && a.start_index == attr.start_index
                && a.end_index == attr.end_index)
        });
        self.attrs.push(attr);
        self.attrs.sort_by_key(|a| a.start_index);
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// In-progress composition reported by the input method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preedit {
    pub text: String,
    /// Cursor position within `text`, in characters.
    pub cursor_pos: i32,
}

impl Preedit {
    /// Single-underline attribute over the whole text.
    ///
    /// Attribute indices are byte offsets; `text.len()` always ends on a
    /// character boundary.
    pub fn attributes(&self) -> AttrList {
        let mut attrs = AttrList::new();
        attrs.change(Attribute::underline(Underline::Single, 0, self.text.len()));
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underline_spans_utf8_bytes() {
        let preedit = Preedit {
            text: "한글".to_string(),
            cursor_pos: 2,
        };
        let attrs = preedit.attributes();
        assert_eq!(attrs.len(), 1);
        assert_eq!(
            attrs.attributes()[0],
            Attribute::underline(Underline::Single, 0, 6)
        );
    }

    #[test]
    fn empty_preedit_still_gets_one_attribute() {
        let attrs = Preedit::default().attributes();
        assert_eq!(attrs.attributes(), &[Attribute::underline(Underline::Single, 0, 0)]);
    }

    #[test]
    fn change_replaces_same_range() {
        let mut attrs = AttrList::new();
        attrs.change(Attribute::underline(Underline::Single, 0, 3));
        attrs.change(Attribute::underline(Underline::Double, 0, 3));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.attributes()[0].attr_type, AttrType::Underline(Underline::Double));
    }
}
