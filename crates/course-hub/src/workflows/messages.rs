//! User-facing rejection messages.

// Allocation
pub const NO_SECRETARIES: &str = "Không có thư ký nào để phân chia";
pub const ALL_APPLICATIONS_ASSIGNED: &str = "Tất cả đơn đăng ký đã được phân chia";

// Lookups
pub const COURSE_NOT_FOUND: &str = "Không tìm thấy khóa học";
pub const USER_NOT_FOUND: &str = "Không tìm thấy người dùng";
pub const APPLICATION_NOT_FOUND: &str = "Không tìm thấy đơn đăng ký";
pub const POST_NOT_FOUND: &str = "Không tìm thấy bài viết";
pub const TEAM_NOT_FOUND: &str = "Không tìm thấy đội";
pub const SHIFT_NOT_FOUND: &str = "Không tìm thấy ca trực";
pub const SHIFT_ASSIGNMENT_NOT_FOUND: &str = "Không tìm thấy phân công ca trực";

// Courses
pub const COURSE_NAME_REQUIRED: &str = "Tên khóa học không được để trống";
pub const COURSE_NAME_TOO_LONG: &str = "Tên khóa học không được vượt quá 200 ký tự";
pub const COURSE_NAME_TAKEN: &str = "Tên khóa học đã tồn tại";
pub const COURSE_CAPACITY_OUT_OF_RANGE: &str = "Số lượng học viên phải từ 1 đến 1000";
pub const COURSE_CAPACITY_BELOW_APPROVED: &str =
    "Số lượng học viên không được nhỏ hơn số đơn đã được duyệt";
pub const COURSE_DATES_INVALID: &str = "Ngày bắt đầu phải trước ngày kết thúc";
pub const APPLICATION_WINDOW_INVALID: &str =
    "Ngày mở đăng ký phải trước ngày đóng đăng ký";
pub const APPLICATION_WINDOW_AFTER_START: &str =
    "Thời gian đăng ký phải kết thúc trước khi khóa học bắt đầu";
pub const COURSE_HAS_APPLICATIONS: &str = "Không thể xóa khóa học đã có đơn đăng ký";

// Users
pub const FULL_NAME_REQUIRED: &str = "Họ tên không được để trống";
pub const FULL_NAME_TOO_LONG: &str = "Họ tên không được vượt quá 100 ký tự";
pub const EMAIL_TAKEN: &str = "Email đã được sử dụng";
pub const STUDENT_CODE_REQUIRED: &str = "Mã sinh viên không được để trống";
pub const STUDENT_CODE_TAKEN: &str = "Mã sinh viên đã tồn tại";
pub const CURRENT_PASSWORD_WRONG: &str = "Mật khẩu hiện tại không đúng";
pub const PASSWORD_UNCHANGED: &str = "Mật khẩu mới phải khác mật khẩu hiện tại";
pub const USER_HAS_PENDING_REVIEWS: &str =
    "Không thể xóa thư ký đang phụ trách đơn đăng ký chờ duyệt";

// Applications
pub const STUDENT_INACTIVE: &str = "Tài khoản sinh viên đã bị khóa";
pub const NOT_A_STUDENT: &str = "Chỉ sinh viên mới được đăng ký khóa học";
pub const COURSE_NOT_OPEN: &str = "Khóa học không mở đăng ký";
pub const OUTSIDE_APPLICATION_WINDOW: &str = "Không nằm trong thời gian đăng ký";
pub const ALREADY_APPLIED: &str = "Sinh viên đã đăng ký khóa học này";
pub const APPLICATION_ALREADY_REVIEWED: &str = "Đơn đăng ký đã được xử lý";
pub const NOT_ASSIGNED_REVIEWER: &str = "Bạn không được phân công xử lý đơn đăng ký này";
pub const COURSE_FULL: &str = "Khóa học đã đủ số lượng học viên";
pub const REJECTION_NOTE_REQUIRED: &str = "Vui lòng nhập lý do từ chối";

// Posts
pub const POST_TITLE_REQUIRED: &str = "Tiêu đề không được để trống";
pub const POST_TITLE_TOO_LONG: &str = "Tiêu đề không được vượt quá 255 ký tự";
pub const POST_CONTENT_REQUIRED: &str = "Nội dung không được để trống";
pub const AUTHOR_INACTIVE: &str = "Tài khoản tác giả đã bị khóa";
pub const IMAGE_TYPE_UNSUPPORTED: &str = "Chỉ chấp nhận ảnh JPEG, PNG, GIF hoặc WEBP";
pub const IMAGE_EMPTY: &str = "Tệp ảnh rỗng";
pub const IMAGE_TOO_LARGE: &str = "Kích thước ảnh vượt quá giới hạn cho phép";
pub const POST_DATE_RANGE_INVALID: &str = "Ngày bắt đầu lọc phải trước ngày kết thúc lọc";

// Teams
pub const TEAM_NAME_REQUIRED: &str = "Tên đội không được để trống";
pub const TEAM_NAME_TOO_LONG: &str = "Tên đội không được vượt quá 100 ký tự";
pub const TEAM_NAME_TAKEN: &str = "Tên đội đã tồn tại trong khóa học";
pub const TEAM_SIZE_OUT_OF_RANGE: &str = "Số thành viên tối đa phải từ 1 đến 50";
pub const TEAM_SIZE_BELOW_MEMBERS: &str =
    "Số thành viên tối đa không được nhỏ hơn số thành viên hiện tại";
pub const TEAM_FULL: &str = "Đội đã đủ thành viên";
pub const NOT_APPROVED_FOR_COURSE: &str = "Sinh viên chưa được duyệt vào khóa học";
pub const ALREADY_IN_TEAM: &str = "Sinh viên đã thuộc một đội trong khóa học";
pub const NOT_A_TEAM_MEMBER: &str = "Người dùng không phải thành viên của đội";

// Night shifts
pub const SHIFT_OUTSIDE_COURSE: &str = "Ngày trực phải nằm trong thời gian khóa học";
pub const SHIFT_TIMES_INVALID: &str = "Giờ bắt đầu và giờ kết thúc không được trùng nhau";
pub const SHIFT_LOCATION_REQUIRED: &str = "Địa điểm trực không được để trống";
pub const SHIFT_LOCATION_TOO_LONG: &str = "Địa điểm trực không được vượt quá 200 ký tự";
pub const SHIFT_STAFF_OUT_OF_RANGE: &str = "Số người trực phải từ 1 đến 20";
pub const SHIFT_STAFF_BELOW_ASSIGNED: &str =
    "Số người trực không được nhỏ hơn số người đã phân công";
pub const SHIFT_HAS_ASSIGNMENTS: &str = "Không thể xóa ca trực đã có người được phân công";
pub const STAFF_INACTIVE: &str = "Tài khoản đã bị khóa";
pub const STAFF_ROLE_REQUIRED: &str = "Chỉ thư ký hoặc quản trị viên mới được phân công trực";
pub const ALREADY_ON_SHIFT: &str = "Người dùng đã được phân công ca trực này";
pub const SHIFT_FULL: &str = "Ca trực đã đủ người";
pub const SHIFT_SAME_DAY_CONFLICT: &str = "Người dùng đã có ca trực khác trong ngày";
