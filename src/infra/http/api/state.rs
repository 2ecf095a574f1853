use std::sync::Arc;

use crate::application::admin_token::AdminToken;
use crate::application::blog::BlogService;
use crate::application::cart::CartService;
use crate::application::categories::CategoryService;
use crate::application::contact::ContactService;
use crate::application::health::HealthService;
use crate::application::newsletter::NewsletterService;
use crate::application::wishlist::WishlistService;

use super::rate_limit::FormRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub blogs: Arc<BlogService>,
    pub product_categories: Arc<CategoryService>,
    pub blog_categories: Arc<CategoryService>,
    pub newsletter: Arc<NewsletterService>,
    pub contact: Arc<ContactService>,
    pub cart: Arc<CartService>,
    pub wishlist: Arc<WishlistService>,
    pub health: Arc<HealthService>,
    /// `None` disables every admin route.
    pub admin_token: Option<AdminToken>,
    pub rate_limiter: Arc<FormRateLimiter>,
}
