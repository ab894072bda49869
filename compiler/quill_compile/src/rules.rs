//! The dispatch-table interpreter.
//!
//! Every grammar production is a [`RuleSet`]: an ordered list of
//! `(priority, rule)` pairs plus a default action. Given the next
//! unconsumed statement, the first rule whose predicate accepts it runs
//! its action; actions may consume further statements, recurse, or
//! delegate to another production. When nothing matches, the default runs.
//!
//! Rule sets are values, not a closed match: [`Grammar::add_rule`] lets
//! downstream modules layer auxiliary statement kinds (tag emitters,
//! exporter-specific directives) onto the base grammar before the first
//! compilation run.

use crate::interp::Interp;
use quill_diagnostic::Result;
use quill_ir::Statement;
use rustc_hash::FxHashMap;

/// Decides whether a rule applies to a statement.
pub type Predicate = Box<dyn Fn(&Statement) -> bool>;

/// Interprets a matched statement. Receives the grammar for recursion into
/// nested productions.
pub type Action = Box<dyn Fn(&Grammar, &mut Interp<'_>, Statement) -> Result<()>>;

/// One patterned action of a production.
pub struct Rule {
    pub predicate: Predicate,
    pub action: Action,
}

impl Rule {
    pub fn new(
        predicate: impl Fn(&Statement) -> bool + 'static,
        action: impl Fn(&Grammar, &mut Interp<'_>, Statement) -> Result<()> + 'static,
    ) -> Self {
        Rule {
            predicate: Box::new(predicate),
            action: Box::new(action),
        }
    }
}

/// Ordered matchers plus a default, for one grammar production.
pub struct RuleSet {
    /// `(priority, insertion sequence, rule)`, kept sorted: higher
    /// priority first, ties in insertion order.
    rules: Vec<(i32, u32, Rule)>,
    next_seq: u32,
    default: Action,
}

impl RuleSet {
    pub fn new(
        default: impl Fn(&Grammar, &mut Interp<'_>, Statement) -> Result<()> + 'static,
    ) -> Self {
        RuleSet {
            rules: Vec::new(),
            next_seq: 0,
            default: Box::new(default),
        }
    }

    /// Register a rule. Higher priorities are consulted earlier; equal
    /// priorities keep registration order.
    pub fn add(&mut self, rule: Rule, priority: i32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self.rules.partition_point(|(p, _, _)| *p >= priority);
        self.rules.insert(at, (priority, seq, rule));
    }

    /// Index of the first rule matching `stmt`, if any.
    pub fn match_index(&self, stmt: &Statement) -> Option<usize> {
        self.rules
            .iter()
            .position(|(_, _, rule)| (rule.predicate)(stmt))
    }

    /// Dispatch one statement.
    pub fn run(&self, grammar: &Grammar, interp: &mut Interp<'_>, stmt: Statement) -> Result<()> {
        match self.match_index(&stmt) {
            Some(i) => (self.rules[i].2.action)(grammar, interp, stmt),
            None => (self.default)(grammar, interp, stmt),
        }
    }
}

/// All productions of the language, keyed by name.
pub struct Grammar {
    sets: FxHashMap<&'static str, RuleSet>,
}

impl Grammar {
    pub fn new() -> Self {
        Grammar {
            sets: FxHashMap::default(),
        }
    }

    /// Install a production. Replaces any previous set under the name.
    pub fn install(&mut self, production: &'static str, set: RuleSet) {
        self.sets.insert(production, set);
    }

    /// Append a rule to an existing production. Returns `false` when the
    /// production does not exist.
    pub fn add_rule(&mut self, production: &str, priority: i32, rule: Rule) -> bool {
        match self.sets.get_mut(production) {
            Some(set) => {
                set.add(rule, priority);
                true
            }
            None => false,
        }
    }

    /// Dispatch one statement through a production.
    pub fn run(&self, production: &str, interp: &mut Interp<'_>, stmt: Statement) -> Result<()> {
        match self.sets.get(production) {
            Some(set) => set.run(self, interp, stmt),
            None => Err(quill_diagnostic::CompilerError::new(
                format!("unknown production `{production}`"),
                stmt.pos,
            )
            .into()),
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule_matching(prefix: &'static str) -> Rule {
        Rule::new(
            move |stmt: &Statement| stmt.text.starts_with(prefix),
            |_, _, _| Ok(()),
        )
    }

    #[test]
    fn first_matching_rule_wins() {
        let mut set = RuleSet::new(|_, _, _| Ok(()));
        set.add(rule_matching("ab"), 0);
        set.add(rule_matching("a"), 0);
        // Both match; registration order breaks the tie.
        assert_eq!(set.match_index(&Statement::new(1, "abc")), Some(0));
        assert_eq!(set.match_index(&Statement::new(1, "ax")), Some(1));
        assert_eq!(set.match_index(&Statement::new(1, "zzz")), None);
    }

    #[test]
    fn higher_priority_is_consulted_first() {
        let mut set = RuleSet::new(|_, _, _| Ok(()));
        set.add(rule_matching("a"), 0);
        set.add(rule_matching("ab"), 10);
        // The later, higher-priority rule now shadows the general one.
        assert_eq!(set.match_index(&Statement::new(1, "abc")), Some(0));
        let probe = Statement::new(1, "ax");
        assert_eq!(set.match_index(&probe), Some(1));
    }

    #[test]
    fn add_rule_rejects_unknown_production() {
        let mut grammar = Grammar::new();
        assert!(!grammar.add_rule("nope", 0, rule_matching("x")));
        grammar.install("body", RuleSet::new(|_, _, _| Ok(())));
        assert!(grammar.add_rule("body", 0, rule_matching("x")));
    }
}
