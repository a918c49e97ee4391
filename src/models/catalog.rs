use serde::{Deserialize, Serialize};

/// Static shop configuration: what can be booked and who does the work.
/// Loaded once at startup; the engine never edits it, it only snapshots
/// names and prices into appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<ServiceItem>,
    pub products: Vec<ProductItem>,
    pub team: Vec<StaffMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub duration: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub brand: String,
    pub category: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub image: Option<String>,
}

static DEFAULT_CATALOG: &str = include_str!("../../assets/catalog.json");

impl Catalog {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// Load from an override path, or fall back to the bundled catalog.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let json = std::fs::read_to_string(p)?;
                Self::from_json(&json)
            }
            None => Self::from_json(DEFAULT_CATALOG),
        }
    }

    pub fn service(&self, id: &str) -> Option<&ServiceItem> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&ProductItem> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn staff(&self, id: &str) -> Option<&StaffMember> {
        self.team.iter().find(|b| b.id == id)
    }
}
