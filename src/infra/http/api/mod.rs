pub mod client;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};

/// Storefront routes: public reads, rate-limited forms and token-guarded
/// admin operations.
pub fn build_api_router(state: ApiState) -> Router {
    let admin_state = state.clone();
    let rate_state = state.clone();

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/all-blogs", get(handlers::list_blogs))
        .route("/blog/{id}", get(handlers::get_blog))
        .route("/blog/{id}/comment", post(handlers::comment_blog))
        .route("/blog/{id}/like", post(handlers::like_blog))
        .route("/categories", get(handlers::list_product_categories))
        .route("/categories/{id}", get(handlers::get_product_category))
        .route("/blog-categories", get(handlers::list_blog_categories))
        .route("/blog-categories/{id}", get(handlers::get_blog_category))
        .route("/newsletter/unsubscribe", post(handlers::unsubscribe))
        .route("/newsletter/preferences", put(handlers::update_preferences))
        .route("/cart/{user_id}", get(handlers::get_cart))
        .route("/cart/add", post(handlers::add_to_cart))
        .route("/cart/update", put(handlers::update_cart_item))
        .route("/cart/remove", delete(handlers::remove_from_cart))
        .route("/cart/clear/{user_id}", delete(handlers::clear_cart))
        .route("/cart/sync", post(handlers::sync_cart))
        .route("/cart/summary/{user_id}", get(handlers::cart_summary))
        .route("/wishlist/{user_id}", get(handlers::get_wishlist))
        .route("/wishlist/add", post(handlers::add_to_wishlist))
        .route("/wishlist/remove", delete(handlers::remove_from_wishlist))
        .route("/wishlist/clear/{user_id}", delete(handlers::clear_wishlist))
        .route(
            "/wishlist/check/{user_id}/{product_id}",
            get(handlers::check_wishlist),
        )
        .route("/wishlist/summary/{user_id}", get(handlers::wishlist_summary))
        .route("/wishlist/sync", post(handlers::sync_wishlist))
        .route("/wishlist/move-to-cart", post(handlers::move_to_cart));

    let forms = Router::new()
        .route("/contact/submit", post(handlers::submit_contact))
        .route("/newsletter/subscribe", post(handlers::subscribe))
        .route_layer(axum_middleware::from_fn_with_state(
            rate_state,
            middleware::form_rate_limit,
        ));

    let admin = Router::new()
        .route("/add-blog", post(handlers::create_blog))
        .route("/update-blog/{id}", put(handlers::update_blog))
        .route("/delete-blog/{id}", post(handlers::delete_blog))
        .route("/categories", post(handlers::create_product_category))
        .route(
            "/categories/{id}",
            put(handlers::update_product_category).delete(handlers::delete_product_category),
        )
        .route(
            "/categories/{id}/toggle-active",
            patch(handlers::toggle_product_category),
        )
        .route(
            "/categories/reorder",
            post(handlers::reorder_product_categories),
        )
        .route(
            "/categories/stats/overview",
            get(handlers::product_category_stats),
        )
        .route("/blog-categories", post(handlers::create_blog_category))
        .route(
            "/blog-categories/{id}",
            put(handlers::update_blog_category).delete(handlers::delete_blog_category),
        )
        .route(
            "/blog-categories/{id}/toggle-active",
            patch(handlers::toggle_blog_category),
        )
        .route(
            "/blog-categories/reorder",
            post(handlers::reorder_blog_categories),
        )
        .route(
            "/blog-categories/stats/overview",
            get(handlers::blog_category_stats),
        )
        .route("/newsletter/stats", get(handlers::newsletter_stats))
        .route("/newsletter/subscribers", get(handlers::list_subscribers))
        .route("/contact/submissions", get(handlers::list_submissions))
        .route(
            "/contact/submission/{id}",
            get(handlers::get_submission).delete(handlers::delete_submission),
        )
        .route(
            "/contact/submission/{id}/status",
            patch(handlers::update_submission_status),
        )
        .route("/contact/stats", get(handlers::contact_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            admin_state,
            middleware::admin_auth,
        ));

    Router::new()
        .merge(public)
        .merge(forms)
        .merge(admin)
        .with_state(state)
}
