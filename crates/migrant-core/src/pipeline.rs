//! Driving recipes over compilation units.
//!
//! One recipe run on one unit goes like this:
//!
//! 1. the applicability filter is checked; a miss returns the unit as is;
//! 2. the recipe's primary pass is queued;
//! 3. passes are taken from the front of the [`PassQueue`] and run over the
//!    whole unit until the queue is empty. A pass may queue more passes,
//!    which run after everything already queued;
//! 4. the [`ImportLedger`] rewrites the import list once.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, debug_span};

use crate::ledger::ImportLedger;
use crate::recipe::Recipe;
use crate::template::TemplateEngine;
use crate::tree::SourceFile;
use crate::visitor::{visit, Diagnostic, Transformer, VisitCtx};

/// FIFO of deferred passes for one unit.
#[derive(Default)]
pub struct PassQueue {
    passes: VecDeque<Box<dyn Transformer>>,
}

impl PassQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pass: Box<dyn Transformer>) {
        self.passes.push_back(pass);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Transformer>> {
        self.passes.pop_front()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl std::fmt::Debug for PassQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassQueue")
            .field("len", &self.passes.len())
            .finish()
    }
}

/// Result of running one or more recipes on a unit.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeOutcome {
    pub source: SourceFile,
    /// False when the root is the one that went in.
    pub changed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run `recipe` over `source`.
pub fn run_recipe(
    recipe: &dyn Recipe,
    source: SourceFile,
    engine: &dyn TemplateEngine,
) -> RecipeOutcome {
    let span = debug_span!("recipe", recipe = recipe.name(), path = %source.path);
    let _enter = span.enter();

    if let Some(applicability) = recipe.applicability() {
        if !applicability.test(&source.tree, source.root) {
            debug!("not applicable");
            return RecipeOutcome {
                source,
                changed: false,
                diagnostics: Vec::new(),
            };
        }
    }

    let SourceFile {
        path,
        mut tree,
        root,
    } = source;
    let mut ledger = ImportLedger::new();
    let mut queue = PassQueue::new();
    let mut diagnostics = Vec::new();
    queue.push(recipe.visitor());

    let mut current = root;
    let mut passes = 0usize;
    while let Some(mut pass) = queue.pop() {
        let mut cx = VisitCtx::new(
            &mut tree,
            &mut ledger,
            &mut queue,
            engine,
            &mut diagnostics,
            recipe.name(),
        );
        current = visit(pass.as_mut(), &mut cx, current);
        passes += 1;
    }
    current = ledger.apply(&mut tree, current);

    let changed = current != root;
    debug!(passes, changed, "recipe finished");
    RecipeOutcome {
        source: SourceFile::new(path, tree, current),
        changed,
        diagnostics,
    }
}

/// Run several recipes in order, each on the previous one's output.
pub fn run_recipes(
    recipes: &[&dyn Recipe],
    source: SourceFile,
    engine: &dyn TemplateEngine,
) -> RecipeOutcome {
    let mut outcome = RecipeOutcome {
        source,
        changed: false,
        diagnostics: Vec::new(),
    };
    for recipe in recipes {
        let next = run_recipe(*recipe, outcome.source, engine);
        outcome.source = next.source;
        outcome.changed |= next.changed;
        outcome.diagnostics.extend(next.diagnostics);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Applicability;
    use crate::template::ArenaTemplateEngine;
    use crate::tree::{NodeId, NodeKind, TreeBuilder};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Logs its label once per run and queues its children.
    struct Logger {
        label: &'static str,
        log: Log,
        then: Vec<Logger>,
    }

    impl Transformer for Logger {
        fn visit_compilation_unit(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
            self.log.borrow_mut().push(self.label);
            for next in self.then.drain(..) {
                cx.do_after_visit(Box::new(next));
            }
            id
        }
    }

    struct Nested(Log);

    impl Recipe for Nested {
        fn name(&self) -> &'static str {
            "test.nested"
        }
        fn display_name(&self) -> &'static str {
            "Nested"
        }
        fn description(&self) -> &'static str {
            "Queues passes from passes."
        }
        fn visitor(&self) -> Box<dyn Transformer> {
            let log = self.0.clone();
            let leaf = |label| Logger {
                label,
                log: log.clone(),
                then: vec![],
            };
            Box::new(Logger {
                label: "primary",
                log: log.clone(),
                then: vec![
                    Logger {
                        label: "first",
                        log: log.clone(),
                        then: vec![leaf("nested")],
                    },
                    leaf("second"),
                ],
            })
        }
    }

    fn empty_unit() -> SourceFile {
        let mut b = TreeBuilder::new();
        let unit = b.unit(None, vec![], vec![]);
        b.finish("Empty.java", unit)
    }

    #[test]
    fn test_passes_run_fifo() {
        let log = Log::default();
        let outcome = run_recipe(
            &Nested(log.clone()),
            empty_unit(),
            &ArenaTemplateEngine::default(),
        );
        assert!(!outcome.changed);
        assert_eq!(*log.borrow(), vec!["primary", "first", "second", "nested"]);
    }

    struct Renamer;

    impl Transformer for Renamer {
        fn visit_compilation_unit(&mut self, cx: &mut VisitCtx<'_>, id: NodeId) -> NodeId {
            match cx.tree.kind(id).clone() {
                NodeKind::CompilationUnit {
                    imports, classes, ..
                } => cx.tree.with_kind(
                    id,
                    NodeKind::CompilationUnit {
                        package: Some("renamed".to_string()),
                        imports,
                        classes,
                    },
                ),
                _ => id,
            }
        }
    }

    struct Guarded;

    impl Recipe for Guarded {
        fn name(&self) -> &'static str {
            "test.guarded"
        }
        fn display_name(&self) -> &'static str {
            "Guarded"
        }
        fn description(&self) -> &'static str {
            "Only runs on units using Marker."
        }
        fn applicability(&self) -> Option<Applicability> {
            Some(Applicability::uses_type("com.example.Marker"))
        }
        fn visitor(&self) -> Box<dyn Transformer> {
            Box::new(Renamer)
        }
    }

    #[test]
    fn test_applicability_gates_traversal() {
        let engine = ArenaTemplateEngine::default();
        let outcome = run_recipe(&Guarded, empty_unit(), &engine);
        assert!(!outcome.changed);
        assert_eq!(outcome.source.package(), None);

        let mut b = TreeBuilder::new();
        let import = b.import("com.example.Marker");
        let unit = b.unit(None, vec![import], vec![]);
        let outcome = run_recipe(&Guarded, b.finish("M.java", unit), &engine);
        assert!(outcome.changed);
        assert_eq!(outcome.source.package(), Some("renamed"));
    }

    #[test]
    fn test_run_recipes_chains() {
        let engine = ArenaTemplateEngine::default();
        let log = Log::default();
        let nested = Nested(log.clone());
        let outcome = run_recipes(&[&nested, &nested], empty_unit(), &engine);
        assert!(!outcome.changed);
        assert_eq!(log.borrow().len(), 8);
    }
}
