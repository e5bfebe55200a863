use regex::Regex;

/// Block text handed to every rule, with an upper-cased copy for keyword scans.
#[derive(Debug, Clone)]
pub struct BlockText<'a> {
    pub raw: &'a str,
    pub upper: String,
}

impl<'a> BlockText<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            upper: raw.to_uppercase(),
        }
    }
}

type Matcher<T> = Box<dyn Fn(&BlockText<'_>) -> Option<T> + Send + Sync>;

/// Named matcher producing a field value, or nothing when the block does not fit it.
pub struct Rule<T> {
    name: &'static str,
    matcher: Matcher<T>,
}

impl<T> Rule<T> {
    pub fn new<F>(name: &'static str, matcher: F) -> Self
    where
        F: Fn(&BlockText<'_>) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            name,
            matcher: Box::new(matcher),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, text: &BlockText<'_>) -> Option<T> {
        (self.matcher)(text)
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Ordered rules for one field. The first rule yielding a value wins, so fallbacks are
/// appended after the rules they back up.
#[derive(Debug)]
pub struct RuleChain<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for RuleChain<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> RuleChain<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, name: &'static str, matcher: F) -> Self
    where
        F: Fn(&BlockText<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.rules.push(Rule::new(name, matcher));
        self
    }

    pub fn push(&mut self, rule: Rule<T>) {
        self.rules.push(rule);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(Rule::name).collect()
    }

    /// Value of the first matching rule together with that rule's name.
    pub fn resolve(&self, text: &BlockText<'_>) -> Option<(T, &'static str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text).map(|value| (value, rule.name())))
    }
}

/// First capture group of `pattern` in `haystack`, trimmed.
pub(crate) fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}
