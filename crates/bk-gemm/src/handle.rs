use crate::vendor::VendorBatchedGemm;
use bk_core::DeviceSpec;
use std::fmt;
use std::sync::Arc;

/// Requested batched-GEMM algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GemmAlgo {
    /// Shape/backend heuristic; requires a square output and picks between
    /// the tiled double-buffered kernel and the per-item serial kernel.
    HeuristicSquare,
    /// Per-item serial kernel, one whole item per worker.
    Serial,
    /// Per-item serial kernel, one output scalar per worker.
    SerialRank0,
    /// Tiled double-buffered kernel, unconditionally.
    DoubleBuffered,
    /// Delegate to a registered vendor-library binding.
    Vendor,
}

impl fmt::Display for GemmAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GemmAlgo::HeuristicSquare => "heuristic-square",
            GemmAlgo::Serial => "plain-serial",
            GemmAlgo::SerialRank0 => "plain-serial-rank0",
            GemmAlgo::DoubleBuffered => "tiled-double-buffer",
            GemmAlgo::Vendor => "vendor-library",
        };
        write!(f, "{name}")
    }
}

/// Configuration handle for batched-GEMM calls.
///
/// Constructed once by the caller and reused across calls with compatible
/// shapes. The selector fills in `team_size` and `vector_len` when it takes
/// the tiled path and they were left unset; nothing else is mutated.
#[derive(Debug, Clone)]
pub struct GemmHandle {
    algo: GemmAlgo,
    device: DeviceSpec,
    team_size: usize,
    vector_len: usize,
    debug: bool,
    vendor: Option<Arc<dyn VendorBatchedGemm>>,
}

impl GemmHandle {
    pub fn new(algo: GemmAlgo, device: DeviceSpec) -> Self {
        GemmHandle {
            algo,
            device,
            team_size: 0,
            vector_len: 0,
            debug: false,
            vendor: None,
        }
    }

    /// Emit a diagnostic dump of the backend classification and the chosen
    /// plan before each dispatch. Observable, no effect on results.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Register a vendor-library binding; required for [`GemmAlgo::Vendor`].
    pub fn with_vendor(mut self, vendor: Arc<dyn VendorBatchedGemm>) -> Self {
        self.vendor = Some(vendor);
        self
    }

    pub fn algo(&self) -> GemmAlgo {
        self.algo
    }

    pub fn device(&self) -> DeviceSpec {
        self.device
    }

    /// Cooperating worker-group size; 0 until auto-tuned.
    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Vector width within a worker group; 0 until auto-tuned.
    pub fn vector_len(&self) -> usize {
        self.vector_len
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn vendor(&self) -> Option<&Arc<dyn VendorBatchedGemm>> {
        self.vendor.as_ref()
    }

    pub(crate) fn record_team_tuning(&mut self, team_size: usize, vector_len: usize) {
        if self.team_size == 0 {
            self.team_size = team_size;
        }
        if self.vector_len == 0 {
            self.vector_len = vector_len;
        }
    }
}

impl Default for GemmHandle {
    fn default() -> Self {
        GemmHandle::new(GemmAlgo::HeuristicSquare, DeviceSpec::host())
    }
}
