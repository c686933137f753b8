use std::sync::Arc;

use upbreed_core::models::{Instructor, InstructorDetails, NewInstructor};
use upbreed_core::query_key::Resource;
use upbreed_core::types::ResourceId;
use upbreed_core::validation::{
    check, FormErrors, ImageField, InstructorForm, LocalFile, UploadRejected,
};
use upbreed_events::Toast;
use upbreed_query::{
    fetcher, DeleteCopy, DeleteDialog, FetchError, ListController, ListOptions, MutateOptions,
    Mutation, MutationConfig, MutationOutcome,
};

use crate::app::AdminApp;
use crate::keys;
use crate::sources::InstructorSource;

use super::{notify_unchanged, FormOutcome};

pub const NOUN: &str = "Instructor";

/// The instructor table: searchable list plus the deactivate dialog.
pub struct InstructorsScreen {
    pub list: ListController<Instructor>,
    pub delete: DeleteDialog,
}

impl InstructorsScreen {
    pub fn new(app: &AdminApp) -> Self {
        Self::with_options(app, app.list_options())
    }

    pub fn with_options(app: &AdminApp, options: ListOptions) -> Self {
        let source = Arc::new(InstructorSource::new(app.api.clone()));
        let api = app.api.clone();
        Self {
            list: ListController::spawn(app.cache.clone(), source, options),
            delete: DeleteDialog::new(
                DeleteCopy::Deactivate,
                Resource::Instructors,
                move |id| {
                    let api = api.clone();
                    async move { api.delete_instructor(id).await }
                },
                app.mutation_context(),
            ),
        }
    }

    /// Headline of the empty state, if the list is empty.
    pub fn empty_title(&self) -> Option<String> {
        self.list
            .current()
            .state
            .ready()
            .and_then(|active| active.empty_title(NOUN))
    }
}

fn form_from(details: &InstructorDetails) -> InstructorForm {
    InstructorForm {
        first_name: details.fname.clone(),
        last_name: details.lname.clone(),
        email: details.email.clone(),
        about: details.instructor_profile.about.clone(),
        image: details
            .instructor_profile
            .profile_picture_url
            .clone()
            .map(ImageField::Remote)
            .unwrap_or_default(),
    }
}

fn payload(form: &InstructorForm) -> NewInstructor {
    NewInstructor {
        fname: form.first_name.trim().to_string(),
        lname: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        about: form.about.clone(),
        profile_picture: form.image.local_file().cloned(),
    }
}

/// The add/edit instructor dialog.
///
/// Opened through the `instructorSetup` URL flag; the `id` param selects
/// edit mode.
pub struct InstructorSetup {
    app: AdminApp,
    editing: Option<ResourceId>,
    baseline: InstructorForm,
    pub form: InstructorForm,
    errors: FormErrors,
    save: Mutation<NewInstructor, Instructor>,
}

impl InstructorSetup {
    /// A blank dialog for a new instructor.
    pub fn create(app: &AdminApp) -> Self {
        let api = app.api.clone();
        let config = MutationConfig::new(
            move |payload: NewInstructor| {
                let api = api.clone();
                async move { api.create_instructor(&payload).await }
            },
            Toast::error("Failed to add instructor"),
        )
        .success_toast(Toast::success("Instructor added successfully"));
        Self::build(app, None, InstructorForm::default(), config)
    }

    /// A dialog pre-filled from instructor `id`.
    pub async fn edit(app: &AdminApp, id: ResourceId) -> Result<Self, FetchError> {
        let api = app.api.clone();
        let fetch = fetcher(move || {
            let api = api.clone();
            async move { api.get_instructor(id).await }
        });
        let value = app.cache.fetch(&keys::instructor(id), &fetch).await?;
        let details: InstructorDetails = serde_json::from_value(value).map_err(FetchError::decode)?;

        let api = app.api.clone();
        let config = MutationConfig::new(
            move |payload: NewInstructor| {
                let api = api.clone();
                async move { api.edit_instructor(id, &payload).await }
            },
            Toast::error("Failed to update instructor"),
        )
        .success_toast(Toast::success("Instructor updated successfully"))
        .invalidates(Resource::Instructor);
        Ok(Self::build(app, Some(id), form_from(&details), config))
    }

    fn build(
        app: &AdminApp,
        editing: Option<ResourceId>,
        form: InstructorForm,
        config: MutationConfig<NewInstructor, Instructor>,
    ) -> Self {
        let state = app.query_state.clone();
        let config = config.invalidates(Resource::Instructors).on_success(move |_| {
            state.instructor_setup().clear();
            state.id().clear();
        });
        app.query_state.instructor_setup().set(true);
        if let Some(id) = editing {
            app.query_state.id().set(id);
        }
        Self {
            app: app.clone(),
            editing,
            baseline: form.clone(),
            form,
            errors: FormErrors::default(),
            save: Mutation::new(config, app.mutation_context()),
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

    /// Take a dropped or picked profile picture.
    pub fn pick_picture(&mut self, file: LocalFile) -> Result<(), UploadRejected> {
        self.form.image.accept(file)
    }

    pub async fn submit(&mut self) -> FormOutcome<Instructor> {
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
            MutationOutcome::Succeeded(instructor) => {
                if self.editing.is_none() {
                    self.form = InstructorForm::default();
                }
                self.baseline = self.form.clone();
                FormOutcome::Saved(instructor)
            }
            MutationOutcome::Failed(e) => FormOutcome::Failed(e),
        }
    }

    /// Close without saving.
    pub fn close(self) {
        self.app.query_state.instructor_setup().clear();
        self.app.query_state.id().clear();
    }
}
