// ViaCEP
// Copyright 2025 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Client for the ViaCEP address-lookup web service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod client;
pub use client::{ViaCepClient, ViaCepOptions};
pub mod clocks;
mod dispatcher;
pub use dispatcher::{DispatchError, Dispatcher};
pub mod env;
#[cfg(any(test, feature = "testutils"))]
mod mock;
#[cfg(any(test, feature = "testutils"))]
pub use mock::MockAddressProvider;

/// Result type for lookups against the upstream service.
pub type LookupResult<T> = Result<T, DispatchError>;

/// Deserializes a string member treating an explicit JSON `null` as absent.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// One address as registered in the upstream service.
///
/// This mirrors the upstream wire schema field by field.  Every field defaults
/// when absent from the payload or set to `null`, so partial responses
/// deserialize cleanly instead of erroring out.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Address {
    /// Postal code in its canonical `NNNNN-NNN` form.
    #[serde(rename = "cep", deserialize_with = "null_as_empty")]
    pub postal_code: String,

    /// Street name, without the house number.
    #[serde(rename = "logradouro", deserialize_with = "null_as_empty")]
    pub street: String,

    /// Free-form complement to the street name (side of the street, block...).
    #[serde(rename = "complemento", deserialize_with = "null_as_empty")]
    pub complement: String,

    /// Neighborhood name.
    #[serde(rename = "bairro", deserialize_with = "null_as_empty")]
    pub neighborhood: String,

    /// City name.
    #[serde(rename = "localidade", deserialize_with = "null_as_empty")]
    pub city: String,

    /// Two-letter state code.
    #[serde(rename = "uf", deserialize_with = "null_as_empty")]
    pub region: String,

    /// IBGE city code.
    #[serde(rename = "ibge", deserialize_with = "null_as_empty")]
    pub ibge_code: String,

    /// GIA taxpayer code, only present for some states.
    #[serde(rename = "gia", deserialize_with = "null_as_empty")]
    pub gia_code: String,

    /// Telephone area code.
    #[serde(rename = "ddd", deserialize_with = "null_as_empty")]
    pub area_code: String,

    /// SIAFI administrative code.
    #[serde(rename = "siafi", deserialize_with = "null_as_empty")]
    pub siafi_code: String,

    /// Marker set by the upstream when a well-formed postal code matches no
    /// registered address.  Such responses come back as 200 with every other
    /// field absent, so this is the only signal of the miss.
    #[serde(rename = "erro", skip_serializing)]
    pub missing: bool,
}

/// Interface to look up addresses.
#[async_trait]
pub trait AddressProvider {
    /// Finds the address registered under the postal `code`, if any.
    async fn find_by_postal_code(&self, code: &str) -> LookupResult<Option<Address>>;

    /// Finds all addresses within `region` and `city` whose street name matches
    /// the `street` fragment.  No match is an empty list, not an error.
    async fn find_by_address(
        &self,
        region: &str,
        city: &str,
        street: &str,
    ) -> LookupResult<Vec<Address>>;
}
