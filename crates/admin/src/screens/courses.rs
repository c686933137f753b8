use std::sync::Arc;

use upbreed_core::models::{Category, Course, CoursePatch, NewCourse, Video, VideoInput};
use upbreed_core::pagination::{ListResponse, PageRequest};
use upbreed_core::query_key::{KeyFilter, Resource};
use upbreed_core::reorder::move_by_id;
use upbreed_core::types::ResourceId;
use upbreed_core::validation::{
    check, CourseEditForm, CourseForm, FormErrors, ImageField, LocalFile, UploadRejected,
};
use upbreed_events::Toast;
use upbreed_query::{
    fetcher, Changes, DeleteCopy, DeleteDialog, EditSession, FetchError, ListController,
    ListOptions, MutateOptions, Mutation, MutationConfig, MutationOutcome, SubmitOutcome,
};

use crate::app::AdminApp;
use crate::keys;
use crate::sources::CourseSource;

use super::FormOutcome;

pub const NOUN: &str = "Course";

const CATEGORY_PICKER_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

pub struct CoursesScreen {
    pub list: ListController<Course>,
    pub delete: DeleteDialog,
}

impl CoursesScreen {
    pub fn new(app: &AdminApp) -> Self {
        Self::with_options(app, app.list_options())
    }

    pub fn with_options(app: &AdminApp, options: ListOptions) -> Self {
        let source = Arc::new(CourseSource::new(app.api.clone()));
        let api = app.api.clone();
        Self {
            list: ListController::spawn(app.cache.clone(), source, options),
            delete: DeleteDialog::new(
                DeleteCopy::Delete,
                Resource::Courses,
                move |id| {
                    let api = api.clone();
                    async move { api.delete_course(id).await }
                },
                app.mutation_context(),
            ),
        }
    }

    pub fn empty_title(&self) -> Option<String> {
        self.list
            .current()
            .state
            .ready()
            .and_then(|active| active.empty_title(NOUN))
    }
}

/// Categories offered by the course forms' picker.
pub async fn category_options(app: &AdminApp) -> Result<Vec<Category>, FetchError> {
    let page = PageRequest::new(1, CATEGORY_PICKER_LIMIT);
    let api = app.api.clone();
    let fetch = fetcher(move || {
        let api = api.clone();
        async move { api.list_categories(page).await }
    });
    let value = app.cache.fetch(&keys::categories(page), &fetch).await?;
    let list: ListResponse<Category> = serde_json::from_value(value).map_err(FetchError::decode)?;
    Ok(list.data)
}

// ---------------------------------------------------------------------------
// Add course
// ---------------------------------------------------------------------------

/// The "add new course" dialog, opened through the `addNewCourse` flag.
pub struct AddCourse {
    app: AdminApp,
    pub form: CourseForm,
    errors: FormErrors,
    create: Mutation<NewCourse, Course>,
}

impl AddCourse {
    pub fn new(app: &AdminApp) -> Self {
        let api = app.api.clone();
        let state = app.query_state.clone();
        let config = MutationConfig::new(
            move |course: NewCourse| {
                let api = api.clone();
                async move { api.create_course(&course).await }
            },
            Toast::error("Failed to add course"),
        )
        .success_toast(Toast::success("Course added successfully"))
        .invalidates(Resource::Courses)
        .on_success(move |_| state.add_new_course().clear());

        app.query_state.add_new_course().set(true);
        Self {
            app: app.clone(),
            form: CourseForm {
                is_active: true,
                ..CourseForm::default()
            },
            errors: FormErrors::default(),
            create: Mutation::new(config, app.mutation_context()),
        }
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_pending(&self) -> bool {
        self.create.is_pending()
    }

    pub fn pick_image(&mut self, file: LocalFile) -> Result<(), UploadRejected> {
        self.form.image.accept(file)
    }

    pub async fn submit(&mut self) -> FormOutcome<Course> {
        if let Err(errors) = check(&self.form) {
            self.errors = errors.clone();
            return FormOutcome::Invalid(errors);
        }
        self.errors = FormErrors::default();

        let course = NewCourse {
            instructor: self.form.instructor,
            title: self.form.title.trim().to_string(),
            description: self.form.description.clone(),
            image: self.form.image.local_file().cloned(),
            is_active: self.form.is_active,
            categories: self.form.categories.clone(),
        };
        match self.create.mutate(course, MutateOptions::default()).await {
            MutationOutcome::Succeeded(created) => FormOutcome::Saved(created),
            MutationOutcome::Failed(e) => FormOutcome::Failed(e),
        }
    }

    pub fn close(self) {
        self.app.query_state.add_new_course().clear();
    }
}

// ---------------------------------------------------------------------------
// Detail: edit + lesson order
// ---------------------------------------------------------------------------

fn edit_form(course: &Course) -> CourseEditForm {
    CourseEditForm {
        title: course.title.clone(),
        description: course.description.clone(),
        categories: course.category_ids(),
        image: course
            .thumbnail
            .clone()
            .map(ImageField::Remote)
            .unwrap_or_default(),
    }
}

/// One course: its edit form and the drag-ordered lesson list.
pub struct CourseDetail {
    id: ResourceId,
    pub course: Course,
    pub session: EditSession<CourseEditForm>,
    save: Mutation<Changes<CourseEditForm>, Course>,
    videos: Vec<Video>,
    save_videos: Mutation<Vec<VideoInput>, Vec<Video>>,
}

impl CourseDetail {
    pub async fn load(app: &AdminApp, id: ResourceId) -> Result<Self, FetchError> {
        let api = app.api.clone();
        let course_fetch = fetcher(move || {
            let api = api.clone();
            async move { api.get_course(id).await }
        });
        let api = app.api.clone();
        let videos_fetch = fetcher(move || {
            let api = api.clone();
            async move { api.get_videos(id).await }
        });
        let course_key = keys::course(id);
        let videos_key = keys::videos(id);
        let (course, videos) = tokio::join!(
            app.cache.fetch(&course_key, &course_fetch),
            app.cache.fetch(&videos_key, &videos_fetch),
        );
        let course: Course = serde_json::from_value(course?).map_err(FetchError::decode)?;
        let videos: Vec<Video> = serde_json::from_value(videos?).map_err(FetchError::decode)?;

        let api = app.api.clone();
        let save = MutationConfig::new(
            move |changes: Changes<CourseEditForm>| {
                let api = api.clone();
                async move {
                    let mut patch = CoursePatch::from_changes(&changes.fields)?;
                    if changes.contains("image") {
                        patch.image = changes.draft.image.local_file().cloned();
                    }
                    api.edit_course(id, &patch).await
                }
            },
            Toast::error("Failed to update course"),
        )
        .success_toast(Toast::success("Course updated successfully"))
        .invalidates(Resource::Courses)
        .invalidates(KeyFilter::exact(&keys::course(id)));

        let api = app.api.clone();
        let save_videos = MutationConfig::new(
            move |videos: Vec<VideoInput>| {
                let api = api.clone();
                async move { api.edit_videos(id, &videos).await }
            },
            Toast::error("Failed to update videos"),
        )
        .success_toast(Toast::success("Videos updated successfully"))
        .invalidates(KeyFilter::exact(&keys::videos(id)));

        Ok(Self {
            id,
            session: EditSession::new(edit_form(&course), app.notifier()),
            course,
            save: Mutation::new(save, app.mutation_context()),
            videos,
            save_videos: Mutation::new(save_videos, app.mutation_context()),
        })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn is_saving(&self) -> bool {
        self.save.is_pending() || self.save_videos.is_pending()
    }

    pub fn pick_image(&mut self, file: LocalFile) -> Result<(), UploadRejected> {
        self.session.draft_mut().image.accept(file)
    }

    /// PATCH the changed fields. An unchanged form sends nothing.
    pub async fn submit(&mut self) -> SubmitOutcome<Course> {
        let outcome = self.session.submit(&self.save).await;
        if let SubmitOutcome::Saved(course) = &outcome {
            self.course = course.clone();
        }
        outcome
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    /// Drop lesson `active` onto lesson `over`. Returns whether the order
    /// changed.
    pub fn move_video(&mut self, active: ResourceId, over: Option<ResourceId>) -> bool {
        move_by_id(&mut self.videos, &active, over.as_ref(), |v| &v.id)
    }

    /// Save the current lesson order.
    pub async fn save_videos(&mut self) -> MutationOutcome<Vec<Video>> {
        let inputs = self.videos.iter().cloned().map(VideoInput::from).collect();
        let outcome = self.save_videos.mutate(inputs, MutateOptions::default()).await;
        if let MutationOutcome::Succeeded(saved) = &outcome {
            self.videos = saved.clone();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use upbreed_core::models::{Category, CourseInstructor};

    use super::*;

    #[test]
    fn edit_form_mirrors_the_course() {
        let course = Course {
            id: 3,
            title: "Course 3".into(),
            description: "Everything about topic number 3.".into(),
            thumbnail: None,
            is_active: true,
            instructor: CourseInstructor {
                id: Some(40),
                fname: "Ross".into(),
                lname: "Geller".into(),
            },
            categories: vec![Category {
                id: 2,
                name: "Design".into(),
            }],
            preview: None,
            videos: Vec::new(),
        };
        let form = edit_form(&course);
        assert_eq!(form.categories, vec![2]);
        assert_eq!(form.image, ImageField::Empty);
        assert!(check(&form).is_ok());
    }
}
