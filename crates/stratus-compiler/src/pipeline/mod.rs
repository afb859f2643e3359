//! Staged compilation facade.
//!
//! `ModuleBuilder` → `ModuleBound` → `ModuleFolded` → `ModuleResolved`.
//! Each stage owns the tree and the accumulated diagnostics; later stages
//! dereference to earlier ones for their accessors.

use std::ops::{Deref, DerefMut};

use stratus_core::SourceMap;

use crate::analyze::validation::finalizer::FinalizerDependencies;
use crate::analyze::validation::{analyze_finalizer, validate_handlers, validate_interpolations};
use crate::analyze::{
    FoldStats, ItemDirectory, bind, evaluate, normalize, resolve_dependencies,
    validate_dependency_cycles,
};
use crate::ast::Ast;
use crate::{Diagnostics, Error};


const DEFAULT_EVALUATION_FUEL: u32 = 1024;
const DEFAULT_FINALIZER_INVOCATION: &str = "Finalizer.Invocation";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Maximum number of folding passes before giving up.
    pub evaluation_fuel: u32,
    /// Full name of the resource that must depend on every other resource.
    pub finalizer_invocation: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            evaluation_fuel: DEFAULT_EVALUATION_FUEL,
            finalizer_invocation: DEFAULT_FINALIZER_INVOCATION.to_owned(),
        }
    }
}

pub struct ModuleBuilder {
    ast: Ast,
    source_map: SourceMap,
    config: CompileConfig,
}

impl ModuleBuilder {
    pub fn new(ast: Ast, source_map: SourceMap) -> Self {
        Self {
            ast,
            source_map,
            config: CompileConfig::default(),
        }
    }

    pub fn with_evaluation_fuel(mut self, fuel: u32) -> Self {
        self.config.evaluation_fuel = fuel;
        self
    }

    pub fn with_finalizer_invocation(mut self, full_name: impl Into<String>) -> Self {
        self.config.finalizer_invocation = full_name.into();
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn bind(mut self) -> ModuleBound {
        let mut diag = Diagnostics::new();
        let directory = bind(&mut self.ast, &mut diag);
        ModuleBound {
            ast: self.ast,
            source_map: self.source_map,
            config: self.config,
            directory,
            diag,
        }
    }

    /// Run every stage.
    ///
    /// User errors stay in the diagnostics of the result; only fuel
    /// exhaustion is an `Err`.
    pub fn compile(self) -> crate::Result<ModuleResolved> {
        Ok(self.bind().fold()?.resolve())
    }
}

#[derive(Debug)]
pub struct ModuleBound {
    ast: Ast,
    source_map: SourceMap,
    config: CompileConfig,
    directory: ItemDirectory,
    diag: Diagnostics,
}

impl ModuleBound {
    /// Desugar interpolated strings and fold to a fixed point.
    pub fn fold(mut self) -> crate::Result<ModuleFolded> {
        let normalized = normalize(&mut self.ast, &self.directory, &mut self.diag);
        let stats = evaluate(
            &mut self.ast,
            &self.directory,
            self.config.evaluation_fuel,
            &mut self.diag,
        )?;
        Ok(ModuleFolded {
            bound: self,
            normalized,
            stats,
        })
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn directory(&self) -> &ItemDirectory {
        &self.directory
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diag.clone()
    }

    pub fn is_valid(&self) -> bool {
        !self.diag.has_errors()
    }

    /// Diagnostics rendered against the module sources.
    pub fn render_diagnostics(&self) -> String {
        self.diag.printer().sources(&self.source_map).render()
    }
}

#[derive(Debug)]
pub struct ModuleFolded {
    bound: ModuleBound,
    normalized: usize,
    stats: FoldStats,
}

impl ModuleFolded {
    pub fn stats(&self) -> FoldStats {
        self.stats
    }

    /// Number of interpolated strings the normalizer rewrote.
    pub fn normalized(&self) -> usize {
        self.normalized
    }

    /// Record dependency edges and run the validators.
    pub fn resolve(mut self) -> ModuleResolved {
        let bound = &mut self.bound;
        resolve_dependencies(&mut bound.ast, &bound.directory, &mut bound.diag);
        let finalizer = analyze_finalizer(
            &mut bound.ast,
            &bound.directory,
            &bound.config.finalizer_invocation,
        );
        validate_handlers(&bound.ast, &bound.directory, &mut bound.diag);
        validate_interpolations(&bound.ast, &mut bound.diag);
        validate_dependency_cycles(&bound.ast, &bound.directory, &mut bound.diag);

        ModuleResolved {
            folded: self,
            finalizer,
        }
    }
}

impl Deref for ModuleFolded {
    type Target = ModuleBound;

    fn deref(&self) -> &Self::Target {
        &self.bound
    }
}

impl DerefMut for ModuleFolded {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bound
    }
}

#[derive(Debug)]
pub struct ModuleResolved {
    folded: ModuleFolded,
    finalizer: Option<FinalizerDependencies>,
}

impl ModuleResolved {
    /// What the finalizer invocation was made to depend on, if the module has one.
    pub fn finalizer_dependencies(&self) -> Option<&FinalizerDependencies> {
        self.finalizer.as_ref()
    }

    /// The annotated tree, or every diagnostic if any of them is an error.
    pub fn into_result(self) -> crate::Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Error::CompilationFailed(self.diagnostics()))
        }
    }

    pub fn into_ast(self) -> Ast {
        self.folded.bound.ast
    }
}

impl Deref for ModuleResolved {
    type Target = ModuleFolded;

    fn deref(&self) -> &Self::Target {
        &self.folded
    }
}

impl DerefMut for ModuleResolved {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.folded
    }
}
