open_string_enum! {
    /// visibility class a service url is published under
    Endpoint {
        Public => "public",
        Internal => "internal",
        Admin => "admin",
    }
}
