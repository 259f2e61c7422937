use serde_json::json;

use stockdesk_core::CategoryId;
use stockdesk_infra::{
    ClientResult, Filter, Select, Table, fetch_all, fetch_one, insert_record, update_by_id,
};
use stockdesk_products::{Category, CategoryDraft};

use super::FormMode;
use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{Redirect, ScreenError, ScreenStatus};
use crate::routes::Route;

#[derive(Debug)]
pub struct CategoriesScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub categories: Vec<Category>,
}

impl CategoriesScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            categories: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = fetch_all(
            self.ctx.data(),
            &Select::from(Table::Categories).order_by("name", true),
        )
        .await
        .map_err(ScreenError::remote(Msg::LoadCategoriesFailed));
        if let Some(categories) = self.status.finish(locale, result) {
            self.categories = categories;
        }
    }

    pub fn confirm_delete(&self) -> &'static str {
        self.ctx.locale().text(Msg::ConfirmDeleteCategory)
    }

    /// Detach the category from its products, delete it, then reload.
    pub async fn delete(&mut self, id: CategoryId) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self
            .remove(id)
            .await
            .map_err(ScreenError::remote(Msg::DeleteCategoryFailed));
        if self.status.finish(locale, result).is_some() {
            self.load().await;
        }
    }

    async fn remove(&self, id: CategoryId) -> ClientResult<()> {
        let data = self.ctx.data();
        let detached = data
            .update(
                Table::Products,
                json!({ "category_id": null }),
                &[Filter::eq("category_id", id)],
            )
            .await?;
        data.delete(Table::Categories, &[Filter::eq("id", id)]).await?;
        tracing::info!(category_id = %id, products = detached.len(), "category deleted");
        Ok(())
    }
}

#[derive(Debug)]
pub struct CategoryForm {
    ctx: AppContext,
    pub mode: FormMode<CategoryId>,
    pub status: ScreenStatus,
    pub input: CategoryDraft,
}

impl CategoryForm {
    pub fn new(ctx: AppContext, mode: FormMode<CategoryId>) -> Self {
        Self {
            ctx,
            mode,
            status: ScreenStatus::default(),
            input: CategoryDraft::default(),
        }
    }

    /// In edit mode, fill the form from the stored category.
    pub async fn load(&mut self) {
        let FormMode::Edit(id) = self.mode else {
            return;
        };
        let locale = self.ctx.locale();
        self.status.begin();
        let query = Select::from(Table::Categories).eq("id", id);
        let result = fetch_one::<Category>(self.ctx.data(), &query)
            .await
            .map_err(ScreenError::remote(Msg::LoadFormFailed));
        if let Some(category) = self.status.finish(locale, result) {
            self.input = category.to_draft();
        }
    }

    pub async fn submit(&mut self) -> Option<Redirect> {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self.save().await;
        self.status.finish(locale, result)?;

        let msg = match self.mode {
            FormMode::Create => Msg::CategoryCreated,
            FormMode::Edit(_) => Msg::CategoryUpdated,
        };
        self.status.succeed(locale, msg);
        Some(Redirect::after(Route::Categories, self.ctx.config().redirect_delay))
    }

    async fn save(&self) -> Result<(), ScreenError> {
        let draft = self.input.validated()?;
        let data = self.ctx.data();
        let written = match self.mode {
            FormMode::Edit(id) => update_by_id(data, Table::Categories, id, &draft).await,
            FormMode::Create => insert_record::<_, Category>(data, Table::Categories, &draft)
                .await
                .map(|_| ()),
        };
        written.map_err(ScreenError::remote(Msg::SaveCategoryFailed))
    }
}
