//! Run-level configuration.

use crate::engine::{DecompositionParams, Strategy};
use crate::policy::SubdivisionPolicy;
use crate::util::{MosaicError, MosaicResult};

/// Settings shared by every engine and job of one render batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Leaf size limit and background color.
    pub params: DecompositionParams,
    /// Region coloring and merge rule.
    pub policy: SubdivisionPolicy,
    /// Decomposition strategy.
    pub strategy: Strategy,
    /// Consecutive output frames rendered with the same animation frame.
    pub repeat: usize,
    /// Resize every output to this height (rounded up to even), if set.
    pub output_height: Option<usize>,
    /// Stretch each leaf template's luminance to the full range when loaded.
    pub normalize_leaf: bool,
    /// Worker thread count; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            params: DecompositionParams::default(),
            policy: SubdivisionPolicy::Color { threshold: 16 },
            strategy: Strategy::default(),
            repeat: 2,
            output_height: None,
            normalize_leaf: true,
            threads: None,
        }
    }
}

impl RenderConfig {
    /// Rejects configurations that would fail every job.
    pub fn validate(&self) -> MosaicResult<()> {
        self.params.validate()?;
        if self.repeat == 0 {
            return Err(MosaicError::InvalidParameters {
                reason: "repeat must be at least 1",
            });
        }
        if self.output_height == Some(0) {
            return Err(MosaicError::InvalidParameters {
                reason: "output_height must be positive",
            });
        }
        if self.threads == Some(0) {
            return Err(MosaicError::InvalidParameters {
                reason: "threads must be positive",
            });
        }
        Ok(())
    }
}
