use serde::Serialize;

#[derive(Serialize)]
pub struct FolderStatusQuery<'a> {
    pub folder: &'a str,
}

#[derive(Serialize)]
pub struct CompletionQuery<'a> {
    pub device: &'a str,
    pub folder: &'a str,
}
