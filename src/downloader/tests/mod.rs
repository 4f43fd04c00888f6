use super::*;
use crate::downloader::test_helpers::*;
use crate::error::Error;
use crate::types::TaskStatus;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
