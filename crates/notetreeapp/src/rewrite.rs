//! # Link Rewrite Engine
//!
//! Page content links to other pages by path (`[Ideas]([0,2])`). Paths are positional,
//! so every structural edit can silently retarget those links. This module keeps them
//! pointing at the same *pages* across a mutation.
//!
//! ## Why Two Phases
//!
//! Swapping A (`[0,0]`) and B (`[0,1]`) yields two rules:
//!
//! ```text
//! A: ]([0,0]) -> ]([0,1])
//! B: ]([0,1]) -> ]([0,0])
//! ```
//!
//! Applied one after the other, A's output is B's input and every link ends up at
//! `[0,0]`. Instead each rule goes through a token unique to the page identity:
//!
//! 1. **Phase 1**: every `old` string becomes `<<LINK UPDATE TOKEN <id>>>`.
//! 2. **Phase 2**: every token becomes its `new` string.
//!
//! Tokens cannot be produced by valid link syntax, so no rule can consume another
//! rule's output. If page text already contains something token-shaped, the tokens
//! of that run get a salt (`<<LINK UPDATE TOKEN #1 <id>>>`) that does not occur in it.
//!
//! Each rule covers both `]([0,1])` and the tooltip form `]([0,1] "title")`.
//!
//! ## Usage
//!
//! ```ignore
//! let before = LinkBindings::capture(&tree);
//! tree.move_sub_page(&path, 1);
//! let plan = RewritePlan::between(&before, &LinkBindings::capture(&tree));
//! plan.apply(&mut tree, RewriteScope::Notebook);
//! ```
//!
//! [`rewrite_around`] bundles those steps for callers that mutate through a closure.
//!
//! Pages present before the mutation but gone after it (deleted subtrees) get a rule
//! that severs their links to the reserved [`DELETED_TARGET`].

use crate::path::{link_target_for, DELETED_TARGET};
use crate::tree::{PageId, PageTree};
use std::collections::BTreeMap;
use tracing::debug;

/// Which pages' content a plan is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteScope {
    Notebook,
    /// The page and all of its descendants.
    Subtree(PageId),
}

/// Snapshot of every attached page's link target, keyed by page identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBindings {
    targets: BTreeMap<PageId, String>,
}

impl LinkBindings {
    pub fn capture(tree: &PageTree) -> Self {
        Self::capture_subtree(tree, tree.root())
    }

    pub fn capture_subtree(tree: &PageTree, root: PageId) -> Self {
        let targets = tree
            .subtree(root)
            .into_iter()
            .filter_map(|id| tree.get(id).map(|node| (id, node.path().link_target())))
            .collect();
        Self { targets }
    }

    /// Bindings built from explicit targets, e.g. paths recorded in an imported file.
    pub fn from_targets(targets: impl IntoIterator<Item = (PageId, String)>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }

    pub fn get(&self, id: PageId) -> Option<&str> {
        self.targets.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub id: PageId,
    pub old: String,
    pub new: String,
}

const TOKEN_PREFIX: &str = "<<LINK UPDATE TOKEN ";

/// `](<path> "` : a link target followed by a tooltip.
fn with_tooltip(target: &str) -> Option<String> {
    target.strip_suffix(')').map(|open| format!("{} \"", open))
}

impl RewriteRule {
    /// The phase-1 token for this rule's page. `salt` is empty unless the scoped text
    /// already contains token-like strings.
    pub fn token(&self, salt: &str) -> String {
        format!("{}{}{}>>", TOKEN_PREFIX, salt, self.id)
    }

    fn tooltip_token(&self, salt: &str) -> String {
        format!("{}{}{} TOOLTIP>>", TOKEN_PREFIX, salt, self.id)
    }

    /// `(old, token, new)` for the bare target and for the tooltip form.
    fn forms(&self, salt: &str) -> Vec<(String, String, String)> {
        let mut forms = vec![(self.old.clone(), self.token(salt), self.new.clone())];
        if let (Some(old), Some(new)) = (with_tooltip(&self.old), with_tooltip(&self.new)) {
            forms.push((old, self.tooltip_token(salt), new));
        }
        forms
    }
}

/// A salt under which no token can already occur in `texts`.
fn salt_for<'a>(texts: impl IntoIterator<Item = &'a str> + Clone) -> String {
    let mut salt = String::new();
    let mut attempt = 0;
    while texts
        .clone()
        .into_iter()
        .any(|text| text.contains(&format!("{}{}", TOKEN_PREFIX, salt)))
    {
        attempt += 1;
        salt = format!("#{} ", attempt);
    }
    salt
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    rules: Vec<RewriteRule>,
}

impl RewritePlan {
    /// Diffs two snapshots. Pages whose target changed are retargeted; pages missing
    /// from `after` are severed.
    pub fn between(before: &LinkBindings, after: &LinkBindings) -> Self {
        let mut rules = Vec::new();
        for (id, old) in &before.targets {
            match after.targets.get(id) {
                Some(new) if new != old => rules.push(RewriteRule {
                    id: *id,
                    old: old.clone(),
                    new: new.clone(),
                }),
                Some(_) => {}
                None => rules.push(RewriteRule {
                    id: *id,
                    old: old.clone(),
                    new: link_target_for(DELETED_TARGET),
                }),
            }
        }
        Self { rules }
    }

    /// Like [`RewritePlan::between`] but ignores pages that disappeared.
    pub fn retarget_only(before: &LinkBindings, after: &LinkBindings) -> Self {
        let mut plan = Self::between(before, after);
        plan.rules
            .retain(|rule| rule.new != link_target_for(DELETED_TARGET));
        plan
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrites content in scope. Returns the number of pages whose content changed.
    pub fn apply(&self, tree: &mut PageTree, scope: RewriteScope) -> usize {
        if self.rules.is_empty() {
            return 0;
        }
        let pages = match scope {
            RewriteScope::Notebook => tree.pre_order(),
            RewriteScope::Subtree(root) => tree.subtree(root),
        };
        let salt = {
            let texts: Vec<&str> = pages
                .iter()
                .filter_map(|id| tree.get(*id).map(|node| node.content.as_str()))
                .collect();
            salt_for(texts.iter().copied())
        };

        let mut changed = 0;
        for id in pages {
            let Some(node) = tree.get(id) else {
                continue;
            };
            if let Some(rewritten) = self.rewrite(&node.content, &salt) {
                tree.set_content(id, rewritten);
                changed += 1;
            }
        }
        debug!(rules = self.rules.len(), pages = changed, "applied link rewrite plan");
        changed
    }

    /// Runs both phases over one string. `None` when nothing matched.
    pub fn apply_to_text(&self, text: &str) -> Option<String> {
        self.rewrite(text, &salt_for([text]))
    }

    fn rewrite(&self, text: &str, salt: &str) -> Option<String> {
        let forms: Vec<(String, String, String)> =
            self.rules.iter().flat_map(|rule| rule.forms(salt)).collect();
        let mut out = text.to_string();
        for (old, token, _) in &forms {
            out = out.replace(old, token);
        }
        for (_, token, new) in &forms {
            out = out.replace(token, new);
        }
        (out != text).then_some(out)
    }
}

/// Captures bindings, runs `mutate`, and rewrites links across `scope`.
///
/// The closure's return value is passed through along with the number of pages whose
/// content was rewritten. Nothing is rewritten when the mutation changed no paths.
pub fn rewrite_around<T>(
    tree: &mut PageTree,
    scope: RewriteScope,
    mutate: impl FnOnce(&mut PageTree) -> T,
) -> (T, usize) {
    let before = LinkBindings::capture(tree);
    let result = mutate(tree);
    let after = LinkBindings::capture(tree);
    let plan = RewritePlan::between(&before, &after);
    let changed = plan.apply(tree, scope);
    (result, changed)
}
