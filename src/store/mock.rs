//! # Mock Store
//!
//! A [`StoreClient`] backed by scripted expectations instead of a real
//! actor. Use it to test service behaviour when the store misbehaves:
//! failed writes, vanished resources, closed channels.
//!
//! Expectations are consumed in order. A request that does not match the
//! next expectation panics the mock task, which surfaces to the caller as
//! [`StoreError::StoreDropped`].
//!
//! # Example
//! ```ignore
//! let mut mock = MockStore::new();
//! mock.expect_get_resource_type().return_ok(Some(doc_type));
//! mock.expect_add_resource().return_err(StoreError::Backend("disk full".into()));
//!
//! let store = mock.client();
//! // hand `store` to a ResourceService...
//! mock.verify();
//! ```

use super::client::StoreClient;
use super::message::StoreRequest;
use super::StoreError;
use crate::model::{Resource, ResourceType};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Scripted answer for the next request.
enum Expectation {
    GetResource(Result<Option<Resource>, StoreError>),
    FindResource(Result<Option<Resource>, StoreError>),
    ListResources(Result<Vec<Resource>, StoreError>),
    AddResource(Result<(), StoreError>),
    UpdateResource(Result<(), StoreError>),
    DeleteResource(Result<(), StoreError>),
    GetResourceType(Result<Option<ResourceType>, StoreError>),
    ListResourceTypes(Result<Vec<ResourceType>, StoreError>),
    AddResourceType(Result<(), StoreError>),
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// A store double with expectation tracking.
pub struct MockStore {
    client: StoreClient,
    expectations: Queue,
    received: Arc<Mutex<Vec<&'static str>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockStore {
    /// Creates a mock with no expectations. Must be called inside a runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(100);
        let expectations: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let received = Arc::new(Mutex::new(Vec::new()));
        let queue = expectations.clone();
        let log = received.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                log.lock().push(request.operation());
                let expectation = queue.lock().pop_front();

                match (request, expectation) {
                    (StoreRequest::GetResource { respond_to, .. }, Some(Expectation::GetResource(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::FindResource { respond_to, .. }, Some(Expectation::FindResource(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::ListResources { respond_to, .. }, Some(Expectation::ListResources(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::AddResource { respond_to, .. }, Some(Expectation::AddResource(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::UpdateResource { respond_to, .. }, Some(Expectation::UpdateResource(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::DeleteResource { respond_to, .. }, Some(Expectation::DeleteResource(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::GetResourceType { respond_to, .. }, Some(Expectation::GetResourceType(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::ListResourceTypes { respond_to }, Some(Expectation::ListResourceTypes(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::AddResourceType { respond_to, .. }, Some(Expectation::AddResourceType(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (request, _) => {
                        panic!("Unexpected store request: {}", request.operation());
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            received,
            _handle: handle,
        }
    }

    /// Returns the client to hand to the code under test.
    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    pub fn expect_get_resource(&mut self) -> ExpectationBuilder<Option<Resource>> {
        self.builder(Expectation::GetResource)
    }

    pub fn expect_find_resource(&mut self) -> ExpectationBuilder<Option<Resource>> {
        self.builder(Expectation::FindResource)
    }

    pub fn expect_list_resources(&mut self) -> ExpectationBuilder<Vec<Resource>> {
        self.builder(Expectation::ListResources)
    }

    pub fn expect_add_resource(&mut self) -> ExpectationBuilder<()> {
        self.builder(Expectation::AddResource)
    }

    pub fn expect_update_resource(&mut self) -> ExpectationBuilder<()> {
        self.builder(Expectation::UpdateResource)
    }

    pub fn expect_delete_resource(&mut self) -> ExpectationBuilder<()> {
        self.builder(Expectation::DeleteResource)
    }

    pub fn expect_get_resource_type(&mut self) -> ExpectationBuilder<Option<ResourceType>> {
        self.builder(Expectation::GetResourceType)
    }

    pub fn expect_list_resource_types(&mut self) -> ExpectationBuilder<Vec<ResourceType>> {
        self.builder(Expectation::ListResourceTypes)
    }

    pub fn expect_add_resource_type(&mut self) -> ExpectationBuilder<()> {
        self.builder(Expectation::AddResourceType)
    }

    /// Operation names of every request received so far.
    pub fn received(&self) -> Vec<&'static str> {
        self.received.lock().clone()
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn builder<T>(&self, wrap: fn(Result<T, StoreError>) -> Expectation) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            wrap,
            expectations: self.expectations.clone(),
        }
    }
}

/// Completes an expectation with the value the mock should answer.
pub struct ExpectationBuilder<T> {
    wrap: fn(Result<T, StoreError>) -> Expectation,
    expectations: Queue,
}

impl<T> ExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, StoreError>) {
        self.expectations.lock().push_back((self.wrap)(response));
    }
}
