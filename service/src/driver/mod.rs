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

//! Business logic for the service.

use std::sync::Arc;
use viacep::{AddressProvider, DispatchError};

mod address;
#[cfg(test)]
pub(crate) mod testutils;

/// Business logic errors.  These errors encompass upstream and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum DriverError {
    /// Catch-all error type for unexpected upstream errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<DispatchError> for DriverError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Upstream(_) => DriverError::BackendError(e.to_string()),
            DispatchError::Json(_) => DriverError::BackendError(e.to_string()),
        }
    }
}

/// Result type for this module.
pub(crate) type DriverResult<T> = Result<T, DriverError>;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": each one issues a single
/// query against the upstream.  For this reason, these operations consume the driver in an
/// attempt to minimize the possibility of accidentally chaining calls.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The provider the driver queries for addresses.
    provider: Arc<dyn AddressProvider + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(provider: Arc<dyn AddressProvider + Send + Sync>) -> Self {
        Self { provider }
    }
}
