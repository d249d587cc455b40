use crate::view::ElementId;

/// A small structural query: alternatives of class sets, optionally scoped to the
/// descendants of one element and filtered by a tag value.
///
/// `Selector::class("a").and_class("b").or_class("c")` reads as `.a.b, .c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    scope: Option<ElementId>,
    alternatives: Vec<Vec<String>>,
    excluded: Vec<String>,
    tag: Option<(String, String)>,
}

impl Selector {
    #[must_use]
    pub fn class(class: &str) -> Self {
        Self { alternatives: vec![vec![class.to_owned()]], ..Self::default() }
    }

    /// Union of single-class alternatives.
    #[must_use]
    pub fn any_class(classes: &[&str]) -> Self {
        Self {
            alternatives: classes.iter().map(|c| vec![(*c).to_owned()]).collect(),
            ..Self::default()
        }
    }

    /// Elements carrying tag `key` with exactly `value`.
    #[must_use]
    pub fn tagged(key: &str, value: &str) -> Self {
        Self { tag: Some((key.to_owned(), value.to_owned())), ..Self::default() }
    }

    /// Narrows every alternative with one more required class.
    #[must_use]
    pub fn and_class(mut self, class: &str) -> Self {
        if self.alternatives.is_empty() {
            self.alternatives.push(Vec::new());
        }
        for alt in &mut self.alternatives {
            alt.push(class.to_owned());
        }
        self
    }

    #[must_use]
    pub fn or_class(mut self, class: &str) -> Self {
        self.alternatives.push(vec![class.to_owned()]);
        self
    }

    #[must_use]
    pub fn without_class(mut self, class: &str) -> Self {
        self.excluded.push(class.to_owned());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tag = Some((key.to_owned(), value.to_owned()));
        self
    }

    /// Restricts matches to descendants of `scope`.
    #[must_use]
    pub const fn within(mut self, scope: ElementId) -> Self {
        self.scope = Some(scope);
        self
    }

    #[must_use]
    pub const fn scope(&self) -> Option<ElementId> {
        self.scope
    }

    /// Evaluates the selector against one element's class list and tag lookup.
    pub fn matches<'a>(
        &self,
        classes: &[String],
        tag: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        let has = |class: &String| classes.iter().any(|c| c == class);

        let class_match = self.alternatives.is_empty()
            || self.alternatives.iter().any(|alt| alt.iter().all(has));
        let not_excluded = !self.excluded.iter().any(has);
        let tag_match =
            self.tag.as_ref().is_none_or(|(key, value)| tag(key.as_str()) == Some(value.as_str()));

        class_match && not_excluded && tag_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn alternatives_are_unions_of_intersections() {
        let sel = Selector::class("a").and_class("b").or_class("c");
        assert!(sel.matches(&classes(&["a", "b"]), |_| None));
        assert!(sel.matches(&classes(&["c"]), |_| None));
        assert!(!sel.matches(&classes(&["a"]), |_| None));
    }

    #[test]
    fn exclusions_and_tags_filter() {
        let sel = Selector::class("cell").without_class("frozen");
        assert!(sel.matches(&classes(&["cell"]), |_| None));
        assert!(!sel.matches(&classes(&["cell", "frozen"]), |_| None));

        let sel = Selector::tagged("shaded", "true");
        assert!(sel.matches(&[], |k| (k == "shaded").then_some("true")));
        assert!(!sel.matches(&[], |_| Some("false")));
    }
}
