//! Reference entities: vendors, companies, document types.
//!
//! Order headers point at these through foreign keys and additionally carry a
//! denormalized display copy that is attached on read (or resolved lazily
//! after the key is set in an editor).

use serde::{Deserialize, Serialize};

use orderdesk_core::{CompanyCode, DocumentTypeId, VendorNumber};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub number: VendorNumber,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub code: CompanyCode,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: DocumentTypeId,
    pub description: String,
}

/// Which reference table a lookup targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Vendor,
    Company,
    DocumentType,
}

impl core::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ReferenceKind::Vendor => "Vendor",
            ReferenceKind::Company => "Company",
            ReferenceKind::DocumentType => "DocumentType",
        };
        f.write_str(name)
    }
}

/// A resolved reference entity of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceEntity {
    Vendor(Vendor),
    Company(Company),
    DocumentType(DocumentType),
}

impl ReferenceEntity {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceEntity::Vendor(_) => ReferenceKind::Vendor,
            ReferenceEntity::Company(_) => ReferenceKind::Company,
            ReferenceEntity::DocumentType(_) => ReferenceKind::DocumentType,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ReferenceEntity::Vendor(v) => v.number.as_str(),
            ReferenceEntity::Company(c) => c.code.as_str(),
            ReferenceEntity::DocumentType(d) => d.id.as_str(),
        }
    }
}
