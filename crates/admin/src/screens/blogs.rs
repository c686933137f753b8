use std::sync::Arc;

use upbreed_core::models::{Blog, BlogKind, NewBlog, PublishedFilter};
use upbreed_core::query_key::Resource;
use upbreed_core::routes::Route;
use upbreed_core::types::ResourceId;
use upbreed_core::validation::{check, BlogForm, FormErrors, ImageField, LocalFile, UploadRejected};
use upbreed_events::Toast;
use upbreed_query::{
    fetcher, DeleteCopy, DeleteDialog, DiscardPrompt, FetchError, ListController, ListOptions,
    MutateOptions, Mutation, MutationConfig, MutationOutcome,
};

use crate::app::AdminApp;
use crate::keys;
use crate::sources::BlogSource;

use super::{notify_unchanged, FormOutcome};

pub const NOUN: &str = "Blog";

/// Blog posts of one section, filtered by publish state.
///
/// Section and filter live in the URL (`category`, `isPublished`); changing
/// either swaps in a fresh list for the new filter.
pub struct BlogsScreen {
    app: AdminApp,
    options: ListOptions,
    kind: BlogKind,
    published: PublishedFilter,
    pub list: ListController<Blog>,
    pub delete: DeleteDialog,
}

impl BlogsScreen {
    pub fn new(app: &AdminApp) -> Self {
        Self::with_options(app, app.list_options())
    }

    pub fn with_options(app: &AdminApp, options: ListOptions) -> Self {
        let kind = app.query_state.blog_category().get();
        let published = app.query_state.is_published().get();
        let api = app.api.clone();
        Self {
            list: spawn_list(app, kind, published, options),
            delete: DeleteDialog::new(
                DeleteCopy::Delete,
                Resource::Blogs,
                move |id| {
                    let api = api.clone();
                    async move { api.delete_blog(id).await }
                },
                app.mutation_context(),
            ),
            app: app.clone(),
            options,
            kind,
            published,
        }
    }

    pub fn kind(&self) -> BlogKind {
        self.kind
    }

    pub fn published(&self) -> PublishedFilter {
        self.published
    }

    pub fn set_kind(&mut self, kind: BlogKind) {
        if kind == self.kind {
            return;
        }
        self.kind = kind;
        self.app.query_state.blog_category().set(kind);
        self.respawn();
    }

    pub fn set_published(&mut self, published: PublishedFilter) {
        if published == self.published {
            return;
        }
        self.published = published;
        self.app.query_state.is_published().set(published);
        self.respawn();
    }

    pub fn filter_open(&self) -> bool {
        self.app.query_state.filter_open().get()
    }

    /// Show or hide the filter panel.
    pub fn toggle_filter(&self) {
        let flag = self.app.query_state.filter_open();
        if flag.get() {
            flag.clear();
        } else {
            flag.set(true);
        }
    }

    fn respawn(&mut self) {
        tracing::debug!(kind = %self.kind, published = %self.published, "Blog filter changed");
        self.list = spawn_list(&self.app, self.kind, self.published, self.options);
    }

    pub fn empty_title(&self) -> Option<String> {
        self.list
            .current()
            .state
            .ready()
            .and_then(|active| active.empty_title(NOUN))
    }
}

fn spawn_list(
    app: &AdminApp,
    kind: BlogKind,
    published: PublishedFilter,
    options: ListOptions,
) -> ListController<Blog> {
    let source = Arc::new(BlogSource::new(app.api.clone(), kind, published));
    ListController::spawn(app.cache.clone(), source, options)
}

fn form_from(blog: &Blog) -> BlogForm {
    BlogForm {
        title: blog.title.clone(),
        description: blog.description.clone(),
        content: blog.content.clone(),
        kind: blog.kind,
        is_published: blog.is_published,
        category_ids: blog.category_ids(),
        preview_image: blog
            .preview_image
            .clone()
            .map(ImageField::Remote)
            .unwrap_or_default(),
    }
}

fn payload(form: &BlogForm) -> NewBlog {
    NewBlog {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        content: form.content.clone(),
        is_published: form.is_published,
        kind: form.kind,
        category_ids: form.category_ids.clone(),
        preview_image: form.preview_image.local_file().cloned(),
    }
}

/// The create/edit blog page.
pub struct BlogEditor {
    app: AdminApp,
    editing: Option<ResourceId>,
    baseline: BlogForm,
    pub form: BlogForm,
    errors: FormErrors,
    save: Mutation<NewBlog, Blog>,
    pub discard: DiscardPrompt,
}

impl BlogEditor {
    pub fn create(app: &AdminApp) -> Self {
        let api = app.api.clone();
        let config = MutationConfig::new(
            move |blog: NewBlog| {
                let api = api.clone();
                async move { api.publish_blog(&blog).await }
            },
            Toast::error("Failed to publish blog"),
        )
        .success_toast(Toast::success("Blog published successfully"));
        let form = BlogForm {
            kind: app.query_state.blog_category().get(),
            ..BlogForm::default()
        };
        Self::build(app, None, form, config)
    }

    /// An editor pre-filled from post `id`.
    pub async fn load(app: &AdminApp, id: ResourceId) -> Result<Self, FetchError> {
        let api = app.api.clone();
        let fetch = fetcher(move || {
            let api = api.clone();
            async move { api.get_blog(id).await }
        });
        let value = app.cache.fetch(&keys::blog(id), &fetch).await?;
        let blog: Blog = serde_json::from_value(value).map_err(FetchError::decode)?;

        let api = app.api.clone();
        let config = MutationConfig::new(
            move |blog: NewBlog| {
                let api = api.clone();
                async move { api.update_blog(id, &blog).await }
            },
            Toast::error("Failed to update blog"),
        )
        .success_toast(Toast::success("Blog updated successfully"))
        .invalidates(Resource::Blog);
        Ok(Self::build(app, Some(id), form_from(&blog), config))
    }

    fn build(
        app: &AdminApp,
        editing: Option<ResourceId>,
        form: BlogForm,
        config: MutationConfig<NewBlog, Blog>,
    ) -> Self {
        let navigator = app.navigator.clone();
        let config = config
            .invalidates(Resource::Blogs)
            .on_success(move |_| navigator.navigate(Route::Blogs));
        Self {
            app: app.clone(),
            editing,
            baseline: form.clone(),
            form,
            errors: FormErrors::default(),
            save: Mutation::new(config, app.mutation_context()),
            discard: DiscardPrompt::new(app.navigator.clone()),
        }
    }

    pub fn editing(&self) -> Option<ResourceId> {
        self.editing
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_pending(&self) -> bool {
        self.save.is_pending()
    }

    pub fn is_dirty(&self) -> bool {
        self.form != self.baseline
    }

    pub fn pick_preview(&mut self, file: LocalFile) -> Result<(), UploadRejected> {
        self.form.preview_image.accept(file)
    }

    pub async fn submit(&mut self) -> FormOutcome<Blog> {
        if let Err(errors) = check(&self.form) {
            self.errors = errors.clone();
            return FormOutcome::Invalid(errors);
        }
        self.errors = FormErrors::default();
        if self.editing.is_some() && !self.is_dirty() {
            notify_unchanged(&self.app);
            return FormOutcome::Unchanged;
        }

        match self.save.mutate(payload(&self.form), MutateOptions::default()).await {
            MutationOutcome::Succeeded(blog) => {
                self.baseline = self.form.clone();
                FormOutcome::Saved(blog)
            }
            MutationOutcome::Failed(e) => FormOutcome::Failed(e),
        }
    }

    /// Leave for `target`. A dirty form asks first and stays put.
    pub fn leave(&self, target: Route) -> bool {
        if self.is_dirty() {
            self.discard.open(target);
            return false;
        }
        self.app.navigator.navigate(target);
        true
    }
}
