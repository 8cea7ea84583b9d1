//! Material classes hauled by the fleet.

/// What a truck carries.  An empty truck carries `Option::<Material>::None`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Material {
    /// Valuable ore, destined for the crusher.
    Mineral,
    /// Overburden, destined for the waste dump.
    Waste,
}

impl Material {
    /// Human-readable label, used for CSV column values and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Material::Mineral => "mineral",
            Material::Waste   => "waste",
        }
    }

    /// Numeric encoding for observation vectors: none = 0, mineral = 1,
    /// waste = 2.
    pub fn code(material: Option<Material>) -> f64 {
        match material {
            None                    => 0.0,
            Some(Material::Mineral) => 1.0,
            Some(Material::Waste)   => 2.0,
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
