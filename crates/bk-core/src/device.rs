use std::fmt;

/// Broad parallelism class of a compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Few fast cores with native short-vector units.
    Host,
    /// Massively parallel, relatively slow per core, no wide-vector fallback.
    Accelerator,
}

/// Microarchitecture family, for tuning-table lookups and known regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Microarch {
    GenericHost,
    /// x86-64 hosts prefer register-blocked serial work for packed scalars.
    X86_64,
    /// A64FX regresses under blocked serial work; unblocked is forced.
    A64fx,
    GenericAccelerator,
    /// gfx908 (MI100-class) over-allocates registers at the default K-tile;
    /// the tuning table widens the K-tile to halve the register blocking.
    Gfx908,
}

/// Tile extents for the double-buffered kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileShape {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

/// Capability descriptor of the compute backend a call targets.
///
/// Looked up once per call (or cached on the handle); all backend-specific
/// constants live in the methods here rather than being scattered through
/// the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSpec {
    class: DeviceClass,
    arch: Microarch,
    /// Compilation mode that trades a small scheduling win for code size;
    /// lowers the alpha-in-fma threshold.
    compact_codegen: bool,
}

impl DeviceSpec {
    pub fn new(class: DeviceClass, arch: Microarch) -> Self {
        DeviceSpec {
            class,
            arch,
            compact_codegen: false,
        }
    }

    /// Generic host-class backend.
    pub fn host() -> Self {
        Self::new(DeviceClass::Host, Microarch::GenericHost)
    }

    /// Generic accelerator-class backend.
    pub fn accelerator() -> Self {
        Self::new(DeviceClass::Accelerator, Microarch::GenericAccelerator)
    }

    pub fn with_compact_codegen(mut self, enabled: bool) -> Self {
        self.compact_codegen = enabled;
        self
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn arch(&self) -> Microarch {
        self.arch
    }

    pub fn is_accelerator(&self) -> bool {
        self.class == DeviceClass::Accelerator
    }

    pub fn is_x86_64(&self) -> bool {
        self.arch == Microarch::X86_64
    }

    /// Microarchitectures where blocked serial work is a known regression.
    pub fn prefers_unblocked_serial(&self) -> bool {
        self.arch == Microarch::A64fx
    }

    /// Tile extents for the double-buffered kernel on this backend.
    ///
    /// gfx908 widens the K-tile from 8 to 16, which halves the per-thread
    /// register blocking and avoids over-allocation at the default shape.
    pub fn tile_shape(&self) -> TileShape {
        let k = match self.arch {
            Microarch::Gfx908 => 16,
            _ => 8,
        };
        TileShape { m: 32, n: 32, k }
    }

    /// Minimum output-row extent before folding alpha into the accumulate
    /// step pays off. Lower under compact codegen, where the separate
    /// multiply's extra instantiations cost more than the scheduling win.
    pub fn alpha_in_fma_threshold(&self) -> usize {
        if self.compact_codegen {
            24
        } else {
            64
        }
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.class, self.arch)
    }
}
