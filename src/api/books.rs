//! Catalog availability endpoint (read-only)

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::book::Book};

/// Get a book's copy counts
#[utoipa::path(
    get,
    path = "/books/{id}/availability",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book with current copy counts", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_availability(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.circulation.book_availability(book_id).await?;
    Ok(Json(book))
}
