// storefront/src/web/envelope.rs

//! The `{ success, data?, message?, count? }` body every endpoint returns.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub count: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
  pub fn data(data: T) -> Self {
    Self {
      success: true,
      data: Some(data),
      message: None,
      count: None,
    }
  }

  pub fn with_message(data: T, message: impl Into<String>) -> Self {
    Self {
      message: Some(message.into()),
      ..Self::data(data)
    }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      message: Some(message.into()),
      count: None,
    }
  }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
  pub fn list(items: Vec<T>) -> Self {
    Self {
      count: Some(items.len()),
      ..Self::data(items)
    }
  }
}

impl ApiResponse<()> {
  pub fn message(message: impl Into<String>) -> Self {
    Self {
      success: true,
      data: None,
      message: Some(message.into()),
      count: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn absent_members_are_omitted() {
    let body = serde_json::to_value(ApiResponse::<()>::failure("Product not found")).unwrap();
    assert_eq!(body, json!({"success": false, "message": "Product not found"}));

    let body = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
    assert_eq!(body, json!({"success": true, "data": [1, 2, 3], "count": 3}));
  }
}
