//! Analysis collaborator seam
//!
//! Type inference and name resolution live outside this pipeline; what
//! comes back across the seam is a fully resolved declaration graph plus
//! an error flag that gates serialization.

use veld_ir::IrModule;
use veld_metadata::Declaration;

/// What the external analyzer hands back for the current module
#[derive(Debug)]
pub struct AnalysisResult {
    /// Resolved IR tree of the current module
    pub module: IrModule,
    /// Flat declaration list for serialization, with origins attached
    pub declarations: Vec<Declaration>,
    /// Whether analysis reported any errors; serialization is skipped
    /// entirely when set
    pub has_errors: bool,
}

impl AnalysisResult {
    /// An analysis result without errors
    pub fn clean(module: IrModule, declarations: Vec<Declaration>) -> Self {
        Self {
            module,
            declarations,
            has_errors: false,
        }
    }

    /// An analysis result that reported errors
    pub fn failed(module: IrModule) -> Self {
        Self {
            module,
            declarations: Vec::new(),
            has_errors: true,
        }
    }
}
