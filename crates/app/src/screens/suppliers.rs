use serde_json::json;

use stockdesk_core::SupplierId;
use stockdesk_infra::{
    ClientResult, Filter, Select, Table, fetch_all, fetch_one, insert_record, update_by_id,
};
use stockdesk_parties::{Supplier, SupplierDraft};

use super::FormMode;
use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{Redirect, ScreenError, ScreenStatus};
use crate::routes::Route;

#[derive(Debug)]
pub struct SuppliersScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub suppliers: Vec<Supplier>,
    pub search: String,
}

impl SuppliersScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            suppliers: Vec::new(),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = fetch_all(
            self.ctx.data(),
            &Select::from(Table::Suppliers).order_by("name", true),
        )
        .await
        .map_err(ScreenError::remote(Msg::LoadSuppliersFailed));
        if let Some(suppliers) = self.status.finish(locale, result) {
            self.suppliers = suppliers;
        }
    }

    /// Suppliers matching the search box over name, contact person, email
    /// and phone.
    pub fn visible(&self) -> Vec<&Supplier> {
        let needle = self.search.trim().to_lowercase();
        self.suppliers
            .iter()
            .filter(|s| s.matches_search(&needle))
            .collect()
    }

    pub fn confirm_delete(&self) -> &'static str {
        self.ctx.locale().text(Msg::ConfirmDeleteSupplier)
    }

    pub async fn delete(&mut self, id: SupplierId) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self
            .remove(id)
            .await
            .map_err(ScreenError::remote(Msg::DeleteSupplierFailed));
        if self.status.finish(locale, result).is_some() {
            self.load().await;
        }
    }

    async fn remove(&self, id: SupplierId) -> ClientResult<()> {
        let data = self.ctx.data();
        data.update(
            Table::Products,
            json!({ "supplier_id": null }),
            &[Filter::eq("supplier_id", id)],
        )
        .await?;
        data.delete(Table::Suppliers, &[Filter::eq("id", id)]).await?;
        tracing::info!(supplier_id = %id, "supplier deleted");
        Ok(())
    }
}

#[derive(Debug)]
pub struct SupplierForm {
    ctx: AppContext,
    pub mode: FormMode<SupplierId>,
    pub status: ScreenStatus,
    pub input: SupplierDraft,
}

impl SupplierForm {
    pub fn new(ctx: AppContext, mode: FormMode<SupplierId>) -> Self {
        Self {
            ctx,
            mode,
            status: ScreenStatus::default(),
            input: SupplierDraft::default(),
        }
    }

    pub async fn load(&mut self) {
        let FormMode::Edit(id) = self.mode else {
            return;
        };
        let locale = self.ctx.locale();
        self.status.begin();
        let query = Select::from(Table::Suppliers).eq("id", id);
        let result = fetch_one::<Supplier>(self.ctx.data(), &query)
            .await
            .map_err(ScreenError::remote(Msg::LoadFormFailed));
        if let Some(supplier) = self.status.finish(locale, result) {
            self.input = supplier.to_draft();
        }
    }

    pub async fn submit(&mut self) -> Option<Redirect> {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self.save().await;
        self.status.finish(locale, result)?;

        let msg = match self.mode {
            FormMode::Create => Msg::SupplierCreated,
            FormMode::Edit(_) => Msg::SupplierUpdated,
        };
        self.status.succeed(locale, msg);
        Some(Redirect::after(Route::Suppliers, self.ctx.config().redirect_delay))
    }

    async fn save(&self) -> Result<(), ScreenError> {
        let draft = self.input.validated()?;
        let data = self.ctx.data();
        let written = match self.mode {
            FormMode::Edit(id) => update_by_id(data, Table::Suppliers, id, &draft).await,
            FormMode::Create => insert_record::<_, Supplier>(data, Table::Suppliers, &draft)
                .await
                .map(|_| ()),
        };
        written.map_err(ScreenError::remote(Msg::SaveSupplierFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::i18n::Locale;
    use crate::screens::testing;
    use stockdesk_parties::ContactInfo;

    #[tokio::test]
    async fn search_covers_contact_fields() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;
        let mut form = SupplierForm::new(ctx.clone(), FormMode::Create);
        form.input = SupplierDraft::new("Acme Snacks").with_contact(ContactInfo {
            phone: Some("03-1234-5678".into()),
            ..ContactInfo::default()
        });
        form.submit().await.unwrap();

        let mut screen = SuppliersScreen::new(ctx);
        screen.load().await;
        let names: Vec<&str> = screen.suppliers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Snacks", "Uji Tea Farm"]);

        screen.search = "SATO".into();
        assert_eq!(screen.visible().len(), 1);
        screen.search = "1234".into();
        assert_eq!(screen.visible()[0].name, "Acme Snacks");
    }

    #[tokio::test]
    async fn delete_detaches_products() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;
        let mut screen = SuppliersScreen::new(ctx);
        screen.load().await;
        screen.delete(SupplierId::new(1)).await;

        assert!(screen.suppliers.is_empty());
        assert!(
            store
                .snapshot(Table::Products)
                .iter()
                .all(|p| p["supplier_id"].is_null())
        );
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let (ctx, _store) = testing::context(AppConfig::default().with_locale(Locale::Ja));
        let mut form = SupplierForm::new(ctx, FormMode::Create);
        form.input = SupplierDraft::new("Acme").with_contact(ContactInfo {
            email: Some("acme.example".into()),
            ..ContactInfo::default()
        });
        assert_eq!(form.submit().await, None);
        assert_eq!(
            form.status.error.as_deref(),
            Some("invalid email address 'acme.example'")
        );
    }

    #[tokio::test]
    async fn edit_updates_in_place() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;
        let mut form = SupplierForm::new(ctx, FormMode::Edit(SupplierId::new(1)));
        form.load().await;
        assert_eq!(form.input.contact.contact_person.as_deref(), Some("Sato"));

        form.input.contact.address = Some("Uji, Kyoto".into());
        form.submit().await.unwrap();
        assert_eq!(form.status.notice.as_deref(), Some("Supplier updated"));
        assert_eq!(store.snapshot(Table::Suppliers)[0]["address"], "Uji, Kyoto");
    }
}
