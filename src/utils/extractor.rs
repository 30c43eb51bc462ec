//! 路径参数提取器
//!
//! 在进入处理函数之前校验路径参数，非法参数直接返回 400。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_block_code;

fn bad_path(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

fn parse_positive_i64(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_path(format!("Missing path parameter '{name}'")))?;
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(bad_path(format!("Invalid path parameter '{name}': {raw}"))),
    }
}

macro_rules! define_id_extractor {
    ($name:ident, $param:literal) => {
        /// 路径中的正整数 ID
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_i64(req, $param).map($name))
            }
        }
    };
}

define_id_extractor!(SafeIDI64, "id");
define_id_extractor!(SafeSubjectIdI64, "subject_id");

/// 路径中的答题块编码
#[derive(Debug, Clone)]
pub struct SafeBlockCode(pub String);

impl FromRequest for SafeBlockCode {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().get("block_code") {
            Some(code) => match validate_block_code(code) {
                Ok(()) => Ok(SafeBlockCode(code.to_string())),
                Err(msg) => Err(bad_path(format!("{msg}: {code}"))),
            },
            None => Err(bad_path("Missing path parameter 'block_code'".to_string())),
        };
        ready(result)
    }
}
