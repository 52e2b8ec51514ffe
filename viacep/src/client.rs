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

//! Address provider backed by the ViaCEP web service.

use crate::clocks::Clock;
use crate::dispatcher::Dispatcher;
use crate::env::get_optional_var;
use crate::{Address, AddressProvider, LookupResult};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use url::Url;

/// Base URL of the public ViaCEP deployment.
const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Options to configure a `ViaCepClient`.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ViaCepOptions {
    /// Base URL of the upstream service, without a trailing slash.
    pub base_url: String,
}

impl Default for ViaCepOptions {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned() }
    }
}

impl ViaCepOptions {
    /// Creates a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_BASE_URL`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            base_url: get_optional_var::<String>(prefix, "BASE_URL")?
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        })
    }
}

/// Address provider that queries the ViaCEP web service.
#[derive(Clone)]
pub struct ViaCepClient {
    /// Parsed base URL under which the lookup paths are rooted.
    base_url: Url,

    /// Dispatcher through which all upstream requests go.
    dispatcher: Dispatcher,
}

impl ViaCepClient {
    /// Creates a new client using `opts` for configuration and `clock` to pace
    /// the rate-limit retry.
    pub fn new(opts: ViaCepOptions, clock: Arc<dyn Clock + Send + Sync>) -> Result<Self, String> {
        let base_url = Url::parse(&opts.base_url)
            .map_err(|e| format!("Invalid base URL {}: {}", opts.base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(format!("Invalid base URL {}: cannot be a base", opts.base_url));
        }
        Ok(Self { base_url, dispatcher: Dispatcher::new(clock)? })
    }

    /// Builds a lookup URL of the form `{base}/{segments...}/json/`.
    ///
    /// Every segment is escaped on its way into the path, so values containing
    /// slashes, spaces or other reserved characters cannot introduce path
    /// segments of their own.
    fn lookup_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut path =
                url.path_segments_mut().expect("Base URL validated at construction time");
            path.pop_if_empty().extend(segments).push("json").push("");
        }
        url
    }
}

#[async_trait]
impl AddressProvider for ViaCepClient {
    async fn find_by_postal_code(&self, code: &str) -> LookupResult<Option<Address>> {
        let url = self.lookup_url(&[code]);
        let address =
            self.dispatcher.send_json::<Address>(url.as_str(), Method::GET, None, &[]).await?;
        // A well-formed but unknown code comes back as a 200 whose only content
        // is the error marker.
        Ok(address.filter(|address| !address.missing))
    }

    async fn find_by_address(
        &self,
        region: &str,
        city: &str,
        street: &str,
    ) -> LookupResult<Vec<Address>> {
        let url = self.lookup_url(&[region, city, street]);
        let addresses = self
            .dispatcher
            .send_json::<Vec<Address>>(url.as_str(), Method::GET, None, &[])
            .await?;
        Ok(addresses.unwrap_or_default())
    }
}
