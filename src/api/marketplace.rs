//! Artisan marketplace: service categories, profiles, portfolios and reviews.

use crate::client::{ApiClient, ApiRequest, MultipartBody};
use crate::error::ApiError;
use crate::models::{
    ArtisanProfile, ArtisanProfileInput, ArtisanProfileList, ArtisanQuery, NewPortfolioItem,
    PortfolioItem, Review, ReviewInput, ServiceCategory,
};

pub struct ServiceCategoriesApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> ServiceCategoriesApi<'a> {
    pub async fn list(&self) -> Result<Vec<ServiceCategory>, ApiError> {
        self.client
            .list(ApiRequest::get("/service-categories/"))
            .await
    }
}

pub struct ArtisansApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> ArtisansApi<'a> {
    pub async fn list(&self, filters: &ArtisanQuery) -> Result<Vec<ArtisanProfileList>, ApiError> {
        self.client
            .list(ApiRequest::get("/artisans/").query(filters)?)
            .await
    }

    pub async fn get(&self, id: i64) -> Result<ArtisanProfile, ApiError> {
        self.client
            .fetch(ApiRequest::get(format!("/artisans/{}/", id)))
            .await
    }

    /// The caller's own profile. A 404 means they have not created one yet.
    pub async fn my_profile(&self) -> Result<ArtisanProfile, ApiError> {
        self.client
            .fetch(ApiRequest::get("/artisans/my-profile/"))
            .await
    }

    pub async fn create(&self, data: &ArtisanProfileInput) -> Result<ArtisanProfile, ApiError> {
        self.client
            .fetch(ApiRequest::post("/artisans/").json(data)?)
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        data: &ArtisanProfileInput,
    ) -> Result<ArtisanProfile, ApiError> {
        self.client
            .fetch(ApiRequest::patch(format!("/artisans/{}/", id)).json(data)?)
            .await
    }

    pub async fn portfolio(&self, id: i64) -> Result<Vec<PortfolioItem>, ApiError> {
        self.client
            .list(ApiRequest::get(format!("/artisans/{}/portfolio/", id)))
            .await
    }

    pub async fn reviews(&self, id: i64) -> Result<Vec<Review>, ApiError> {
        self.client
            .list(ApiRequest::get(format!("/artisans/{}/reviews/", id)))
            .await
    }
}

pub struct PortfolioApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> PortfolioApi<'a> {
    pub async fn list(&self, artisan: Option<i64>) -> Result<Vec<PortfolioItem>, ApiError> {
        let mut request = ApiRequest::get("/portfolio/");
        if let Some(artisan) = artisan {
            request = request.param("artisan", artisan);
        }
        self.client.list(request).await
    }

    pub async fn create(&self, item: NewPortfolioItem) -> Result<PortfolioItem, ApiError> {
        let body = MultipartBody::new()
            .text("artisan", item.artisan)
            .file("image", item.image)
            .text("title", item.title)
            .text("description", item.description);
        self.client
            .fetch(ApiRequest::post("/portfolio/").multipart(body))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .send(ApiRequest::delete(format!("/portfolio/{}/", id)))
            .await
    }
}

pub struct ReviewsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl<'a> ReviewsApi<'a> {
    pub async fn list(&self, artisan: Option<i64>) -> Result<Vec<Review>, ApiError> {
        let mut request = ApiRequest::get("/reviews/");
        if let Some(artisan) = artisan {
            request = request.param("artisan", artisan);
        }
        self.client.list(request).await
    }

    pub async fn create(&self, data: &ReviewInput) -> Result<Review, ApiError> {
        self.client.fetch(ApiRequest::post("/reviews/").json(data)?).await
    }
}
