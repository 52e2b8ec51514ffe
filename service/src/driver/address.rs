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

//! Operations on addresses.

use crate::driver::{Driver, DriverError, DriverResult};
use viacep::Address;

impl Driver {
    /// Gets the address registered under the postal `code`.
    pub(crate) async fn get_address(self, code: &str) -> DriverResult<Address> {
        match self.provider.find_by_postal_code(code).await? {
            Some(address) => Ok(address),
            None => {
                Err(DriverError::NotFound(format!("No address matches postal code {}", code)))
            }
        }
    }

    /// Finds all addresses within `region` and `city` whose street name matches the
    /// `street` fragment.
    ///
    /// A search with no matches yields an empty list, not an error.
    pub(crate) async fn search_addresses(
        self,
        region: &str,
        city: &str,
        street: &str,
    ) -> DriverResult<Vec<Address>> {
        Ok(self.provider.find_by_address(region, city, street).await?)
    }
}
