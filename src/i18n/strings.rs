/// All localized user-facing strings for a language.
///
/// Placeholders are written as `{name}` and filled with `str::replace`.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Submission Envelope ====================
    /// Generic failure shown for any unexpected or network error
    pub generic_failure: &'static str,

    /// Success message for the start-project form
    pub project_request_received: &'static str,

    /// Success message for the contact and service inquiry forms
    pub contact_received: &'static str,

    /// Shown when server-side validation rejects the submission
    pub validation_failed: &'static str,

    // ==================== Field Validation ====================
    pub field_required: &'static str,
    pub invalid_email: &'static str,
    pub project_type_required: &'static str,

    /// Placeholders: {max}
    pub field_too_long: &'static str,

    // ==================== Content / Admin Responses ====================
    pub content_not_found: &'static str,
    pub unknown_content_type: &'static str,
    pub unauthorized: &'static str,

    // ==================== Admin Notification Email ====================
    /// Placeholders: {name}
    pub project_notification_subject: &'static str,

    /// Placeholders: {name}
    pub contact_notification_subject: &'static str,

    pub project_notification_heading: &'static str,
    pub contact_notification_heading: &'static str,

    pub label_name: &'static str,
    pub label_email: &'static str,
    pub label_phone: &'static str,
    pub label_company: &'static str,
    pub label_website: &'static str,
    pub label_project_type: &'static str,
    pub label_budget: &'static str,
    pub label_deadline: &'static str,
    pub label_message: &'static str,
    pub label_service: &'static str,
    pub label_source_url: &'static str,
    pub label_locale: &'static str,

    /// Shown in place of an empty optional field
    pub not_provided: &'static str,

    // ==================== Auto-reply Email ====================
    pub auto_reply_subject: &'static str,

    /// Placeholders: {name}
    pub auto_reply_greeting: &'static str,

    pub auto_reply_body: &'static str,
    pub auto_reply_signoff: &'static str,
}

// ==================== English Strings ====================

pub static ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    generic_failure: "Something went wrong, please try again.",
    project_request_received: "Thank you! We received your project request and will get back to you soon.",
    contact_received: "Thank you for reaching out. We will reply shortly.",
    validation_failed: "Please check the highlighted fields.",

    field_required: "This field is required.",
    invalid_email: "Please enter a valid email address.",
    project_type_required: "Please choose a project type or describe your project.",
    field_too_long: "Please keep this under {max} characters.",

    content_not_found: "The requested content could not be found.",
    unknown_content_type: "Unknown content type.",
    unauthorized: "Unauthorized.",

    project_notification_subject: "New project request from {name}",
    contact_notification_subject: "New message from {name}",
    project_notification_heading: "New project request",
    contact_notification_heading: "New contact message",

    label_name: "Name",
    label_email: "Email",
    label_phone: "Phone",
    label_company: "Company",
    label_website: "Website",
    label_project_type: "Project type",
    label_budget: "Budget",
    label_deadline: "Timeline",
    label_message: "Message",
    label_service: "Service",
    label_source_url: "Submitted from",
    label_locale: "Language",
    not_provided: "Not provided",

    auto_reply_subject: "We received your request | Ario Studio",
    auto_reply_greeting: "Hi {name},",
    auto_reply_body: "Thank you for contacting Ario Studio. Our team has received your message and will get back to you within two business days.",
    auto_reply_signoff: "Warm regards,\nThe Ario Studio team",
};

// ==================== Persian Strings ====================

pub static PERSIAN_STRINGS: LanguageStrings = LanguageStrings {
    generic_failure: "مشکلی پیش آمد، لطفاً دوباره تلاش کنید.",
    project_request_received: "متشکریم! درخواست پروژه شما دریافت شد و به‌زودی با شما تماس می‌گیریم.",
    contact_received: "از پیام شما متشکریم. به‌زودی پاسخ می‌دهیم.",
    validation_failed: "لطفاً فیلدهای مشخص‌شده را بررسی کنید.",

    field_required: "این فیلد الزامی است.",
    invalid_email: "لطفاً یک ایمیل معتبر وارد کنید.",
    project_type_required: "لطفاً نوع پروژه را انتخاب کنید یا پروژه خود را توضیح دهید.",
    field_too_long: "لطفاً کمتر از {max} کاراکتر بنویسید.",

    content_not_found: "محتوای درخواستی پیدا نشد.",
    unknown_content_type: "نوع محتوا نامعتبر است.",
    unauthorized: "دسترسی غیرمجاز.",

    project_notification_subject: "درخواست پروژه جدید از {name}",
    contact_notification_subject: "پیام جدید از {name}",
    project_notification_heading: "درخواست پروژه جدید",
    contact_notification_heading: "پیام تماس جدید",

    label_name: "نام",
    label_email: "ایمیل",
    label_phone: "تلفن",
    label_company: "شرکت",
    label_website: "وب‌سایت",
    label_project_type: "نوع پروژه",
    label_budget: "بودجه",
    label_deadline: "زمان‌بندی",
    label_message: "پیام",
    label_service: "خدمت",
    label_source_url: "ارسال‌شده از",
    label_locale: "زبان",
    not_provided: "وارد نشده",

    auto_reply_subject: "درخواست شما دریافت شد | آریو استودیو",
    auto_reply_greeting: "{name} عزیز،",
    auto_reply_body: "از تماس شما با آریو استودیو متشکریم. تیم ما پیام شما را دریافت کرده و ظرف دو روز کاری با شما تماس می‌گیرد.",
    auto_reply_signoff: "با احترام،\nتیم آریو استودیو",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_placeholders() {
        for strings in [&ENGLISH_STRINGS, &PERSIAN_STRINGS] {
            assert!(strings.project_notification_subject.contains("{name}"));
            assert!(strings.contact_notification_subject.contains("{name}"));
            assert!(strings.auto_reply_greeting.contains("{name}"));
            assert!(strings.field_too_long.contains("{max}"));
        }
    }

    #[test]
    fn test_no_empty_messages() {
        for strings in [&ENGLISH_STRINGS, &PERSIAN_STRINGS] {
            assert!(!strings.generic_failure.is_empty());
            assert!(!strings.field_required.is_empty());
            assert!(!strings.invalid_email.is_empty());
            assert!(!strings.not_provided.is_empty());
        }
    }

    #[test]
    fn test_persian_strings_are_translated() {
        assert_ne!(PERSIAN_STRINGS.invalid_email, ENGLISH_STRINGS.invalid_email);
        assert_ne!(PERSIAN_STRINGS.label_name, ENGLISH_STRINGS.label_name);
    }
}
