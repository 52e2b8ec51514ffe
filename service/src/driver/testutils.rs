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

//! Test utilities for the business layer.

use crate::driver::Driver;
use async_trait::async_trait;
use std::sync::Arc;
use viacep::{Address, AddressProvider, DispatchError, LookupResult, MockAddressProvider};

/// Returns the fixed set of addresses the tests run against.
pub(crate) fn sample_addresses() -> Vec<Address> {
    vec![
        Address {
            postal_code: "01001-000".to_owned(),
            street: "Praça da Sé".to_owned(),
            complement: "lado ímpar".to_owned(),
            neighborhood: "Sé".to_owned(),
            city: "São Paulo".to_owned(),
            region: "SP".to_owned(),
            ibge_code: "3550308".to_owned(),
            gia_code: "1004".to_owned(),
            area_code: "11".to_owned(),
            siafi_code: "7107".to_owned(),
            ..Default::default()
        },
        Address {
            postal_code: "01001-001".to_owned(),
            street: "Praça da Sé".to_owned(),
            complement: "lado par".to_owned(),
            neighborhood: "Sé".to_owned(),
            city: "São Paulo".to_owned(),
            region: "SP".to_owned(),
            ibge_code: "3550308".to_owned(),
            gia_code: "1004".to_owned(),
            area_code: "11".to_owned(),
            siafi_code: "7107".to_owned(),
            ..Default::default()
        },
        Address {
            postal_code: "70040-010".to_owned(),
            street: "Praça dos Três Poderes".to_owned(),
            neighborhood: "Zona Cívico-Administrativa".to_owned(),
            city: "Brasília".to_owned(),
            region: "DF".to_owned(),
            ibge_code: "5300108".to_owned(),
            area_code: "61".to_owned(),
            siafi_code: "9701".to_owned(),
            ..Default::default()
        },
    ]
}

/// Address provider that fails every lookup with an upstream error.
struct FailingProvider {
    /// The message carried by every returned error.
    message: &'static str,
}

#[async_trait]
impl AddressProvider for FailingProvider {
    async fn find_by_postal_code(&self, _code: &str) -> LookupResult<Option<Address>> {
        Err(DispatchError::Upstream(self.message.to_owned()))
    }

    async fn find_by_address(
        &self,
        _region: &str,
        _city: &str,
        _street: &str,
    ) -> LookupResult<Vec<Address>> {
        Err(DispatchError::Upstream(self.message.to_owned()))
    }
}

/// Creates a driver whose provider fails every lookup with `message`.
pub(crate) fn failing_driver(message: &'static str) -> Driver {
    let provider = Arc::from(FailingProvider { message });
    Driver::new(provider)
}

/// State for tests against a driver backed by the sample addresses.
pub(crate) struct TestContext {
    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Creates a context whose provider serves the sample addresses.
    pub(crate) fn setup() -> Self {
        let provider = Arc::from(MockAddressProvider::new(sample_addresses()));
        Self { driver: Driver::new(provider) }
    }

    /// Returns a driver to operate against the fixed data set.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }
}
