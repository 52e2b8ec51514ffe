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

//! Address provider backed by an in-memory list for testing purposes.

use crate::{Address, AddressProvider, LookupResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Normalizes a postal code for comparison by dropping the separator, so the
/// query form of a code matches its canonically-formatted record.
fn normalize(code: &str) -> String {
    code.replace('-', "")
}

/// Address provider that serves a fixed list of addresses.
#[derive(Clone)]
pub struct MockAddressProvider {
    /// The addresses known to the provider.
    data: Arc<Vec<Address>>,
}

impl MockAddressProvider {
    /// Creates a new mock provider serving `addresses`.
    pub fn new(addresses: Vec<Address>) -> Self {
        Self { data: Arc::from(addresses) }
    }
}

#[async_trait]
impl AddressProvider for MockAddressProvider {
    async fn find_by_postal_code(&self, code: &str) -> LookupResult<Option<Address>> {
        let code = normalize(code);
        Ok(self.data.iter().find(|address| normalize(&address.postal_code) == code).cloned())
    }

    async fn find_by_address(
        &self,
        region: &str,
        city: &str,
        street: &str,
    ) -> LookupResult<Vec<Address>> {
        // Region and city must match exactly; the street is a substring match,
        // which is what the real service does.
        let street = street.to_lowercase();
        Ok(self
            .data
            .iter()
            .filter(|address| {
                address.region == region
                    && address.city == city
                    && address.street.to_lowercase().contains(&street)
            })
            .cloned()
            .collect())
    }
}
