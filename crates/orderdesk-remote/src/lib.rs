// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use orderdesk_app::{
    DetailPatch, InfoCard, Order, OrderDetail, OrderId, OrderStatus, OrdersBackend, StatusPatch,
};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking client for the orders REST API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("remote.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("remote.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "remote.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("remote.base_url {trimmed:?} cannot carry a path");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn list_orders(&self) -> Result<Vec<Order>> {
        let response = self.send(self.request(Method::GET, &["orders"])?)?;
        response.json().context("decode order list")
    }

    pub fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        let response = self.send(self.request(Method::GET, &["order_details", id.as_str()])?)?;
        response.json().context("decode order details")
    }

    pub fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let request = self
            .request(Method::PATCH, &["orders", id.as_str()])?
            .json(&StatusPatch { status });
        let response = self.send(request)?;
        response.json().context("decode updated order")
    }

    pub fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail> {
        let request = self
            .request(Method::PATCH, &["order_details", id.as_str()])?
            .json(patch);
        let response = self.send(request)?;
        response.json().context("decode updated order details")
    }

    /// Any 2xx counts as an acknowledgement; the body is ignored.
    pub fn delete_order(&self, id: &OrderId) -> Result<()> {
        self.send(self.request(Method::DELETE, &["orders", id.as_str()])?)?;
        Ok(())
    }

    pub fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        let response = self.send(self.request(Method::GET, &["info"])?)?;
        response.json().context("decode dashboard info")
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("remote.base_url {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "orders api request");
        Ok(self.http.request(method, url))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

impl OrdersBackend for Client {
    fn list_orders(&self) -> Result<Vec<Order>> {
        Client::list_orders(self)
    }

    fn order_detail(&self, id: &OrderId) -> Result<OrderDetail> {
        Client::order_detail(self, id)
    }

    fn patch_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        Client::patch_order_status(self, id, status)
    }

    fn patch_order_detail(&self, id: &OrderId, patch: &DetailPatch) -> Result<OrderDetail> {
        Client::patch_order_detail(self, id, patch)
    }

    fn delete_order(&self, id: &OrderId) -> Result<()> {
        Client::delete_order(self, id)
    }

    fn dashboard_info(&self) -> Result<Vec<InfoCard>> {
        Client::dashboard_info(self)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("{base_url} did not answer in time -- check the API or raise remote.timeout");
    }
    anyhow!("cannot reach {base_url} -- is the orders API running? ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.detail.and_then(ErrorDetail::into_message)
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<ErrorDetail>,
}

/// `detail` is either a plain message or a list of validation problems.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Problems(Vec<ErrorProblem>),
}

#[derive(Debug, Deserialize)]
struct ErrorProblem {
    msg: String,
}

impl ErrorDetail {
    fn into_message(self) -> Option<String> {
        let message = match self {
            Self::Message(message) => message,
            Self::Problems(problems) => problems
                .into_iter()
                .map(|problem| problem.msg)
                .collect::<Vec<_>>()
                .join("; "),
        };
        (!message.trim().is_empty()).then_some(message)
    }
}
