//! Catalogue of the resource types served through the read-through cache.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::records::WriteKind;

/// A resource type backed by one relational table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Users,
    Bookmarks,
    Prayers,
    Donations,
    Orphanages,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Users,
        Resource::Bookmarks,
        Resource::Prayers,
        Resource::Donations,
        Resource::Orphanages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Bookmarks => "bookmarks",
            Resource::Prayers => "prayers",
            Resource::Donations => "donations",
            Resource::Orphanages => "orphanages",
        }
    }

    /// Relational table holding the canonical rows.
    pub fn table(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Bookmarks => "bookmark",
            Resource::Prayers => "doa",
            Resource::Donations => "donation",
            Resource::Orphanages => "rumah_yatim",
        }
    }

    pub fn primary_key(self) -> &'static str {
        match self {
            Resource::Prayers => "id_doa",
            _ => "id",
        }
    }

    /// Path segment under `/cache`.
    pub fn route_segment(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Bookmarks => "bookmark",
            Resource::Prayers => "doa",
            Resource::Donations => "donation",
            Resource::Orphanages => "rumah_yatim",
        }
    }

    /// Label used in the `"<label> tidak ditemukan"` error body.
    pub fn not_found_label(self) -> &'static str {
        match self {
            Resource::Users => "User",
            Resource::Bookmarks => "bookmark",
            Resource::Prayers => "doa",
            Resource::Donations => "donasi",
            Resource::Orphanages => "panti",
        }
    }

    pub fn not_found_message(self) -> String {
        format!("{} tidak ditemukan", self.not_found_label())
    }

    /// Name used in the plain CRUD responses.
    pub fn entity_label(self) -> &'static str {
        match self {
            Resource::Users => "User",
            Resource::Bookmarks => "Bookmark",
            Resource::Prayers => "Doa",
            Resource::Donations => "Donation",
            Resource::Orphanages => "Rumah Yatim",
        }
    }

    /// Writable columns other than the primary key.
    pub fn data_columns(self) -> &'static [&'static str] {
        match self {
            Resource::Users => &["username", "name", "email", "password"],
            Resource::Bookmarks => &["user_id", "rumah_yatim_id"],
            Resource::Prayers => &["nama_doa", "isi_doa", "latin", "arti"],
            Resource::Donations => &[
                "user_id",
                "rumah_yatim_id",
                "amount",
                "payment_method",
                "status",
                "transaction_id",
            ],
            Resource::Orphanages => &[
                "nama_panti",
                "nama_kota",
                "nama_pengurus",
                "alamat",
                "foto",
                "deskripsi",
                "jumlah_anak",
                "kapasitas",
                "kontak",
                "latitude",
                "longtitude",
            ],
        }
    }

    /// Prayers always take a generated key; every other table lets the caller pick one.
    pub fn client_assigns_key(self) -> bool {
        self != Resource::Prayers
    }

    pub fn accepts_column(self, kind: WriteKind, column: &str) -> bool {
        if column == self.primary_key() {
            return kind == WriteKind::Create && self.client_assigns_key();
        }
        self.data_columns().contains(&column)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
